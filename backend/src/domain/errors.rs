//! Validation failures surfaced by the domain services.
//!
//! Messages are user-facing and shown as-is by the notification layer, so
//! they are written in the application language.

use thiserror::Error;

/// Rejections of user-submitted input; nothing is committed when one of
/// these is returned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Descrição é obrigatória")]
    EmptyDescription,

    #[error("Descrição muito longa (máximo {0} caracteres)")]
    DescriptionTooLong(usize),

    #[error("Categoria é obrigatória")]
    EmptyCategory,

    #[error("Valor deve ser maior que zero")]
    AmountNotPositive,

    #[error("Limite deve ser maior que zero")]
    LimitNotPositive,

    #[error("Mês inválido")]
    InvalidMonth,

    #[error("Parcelamento exige pagamento no crédito")]
    InstallmentsRequireCredit,

    #[error("Número de parcelas deve estar entre {min} e {max}")]
    InstallmentCountOutOfRange { min: u32, max: u32 },

    #[error("Você não tem permissão para editar este perfil")]
    ReadOnlyProfile,

    #[error("E-mail é obrigatório")]
    EmptyEmail,

    #[error("Usuário já adicionado")]
    DuplicateGrant,

    #[error("Nome da categoria é obrigatório")]
    EmptyCategoryName,

    #[error("Categoria já existe")]
    DuplicateCategory,
}
