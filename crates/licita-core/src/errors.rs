//! Erros do núcleo. Tudo que cruza a fronteira do core é valor tipado;
//! exceções ficam para condições realmente inesperadas.

use thiserror::Error;

use licita_domain::{ArtifactKind, DomainError};

use crate::gateway::GatewayError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Saída do modelo estruturalmente inválida mesmo após uma tentativa
    /// de reparo; `bruto` carrega o texto devolvido para diagnóstico.
    #[error("saída fora do esquema de {artefato}: {campos:?}")]
    SchemaViolation { artefato: ArtifactKind, campos: Vec<String>, bruto: String },

    /// Artefato/versão inexistente no store.
    #[error("não encontrado: {artefato} v{versao:?}")]
    NotFound { artefato: ArtifactKind, versao: Option<u32> },

    /// Promoção barrada: predecessor ausente ou fora do check rígido.
    #[error("promoção bloqueada por {predecessor}: faltam {campos_faltantes:?}")]
    PromotionBlocked { predecessor: ArtifactKind, campos_faltantes: Vec<String> },

    /// Modelo inacessível (sem credencial, rede persistentemente fora,
    /// serviço indisponível). O chamador mantém a entrada.
    #[error("modelo indisponível: {0}")]
    ModelUnavailable(String),

    #[error("tempo esgotado na chamada ao modelo")]
    Timeout,

    #[error("chamada cancelada")]
    Cancelled,

    /// Entrada do usuário vazia; recuperável localmente.
    #[error("entrada vazia")]
    EntradaVazia,

    /// Falha de gravação/leitura do estado persistido.
    #[error("persistência: {0}")]
    Persistencia(String),

    #[error(transparent)]
    Dominio(#[from] DomainError),

    #[error("interno: {0}")]
    Interno(String),
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(m) => CoreError::ModelUnavailable(m),
            GatewayError::ModelUnavailable(m) => CoreError::ModelUnavailable(m),
            GatewayError::Timeout => CoreError::Timeout,
            GatewayError::Cancelled => CoreError::Cancelled,
            GatewayError::SchemaViolation { bruto } => {
                CoreError::Interno(format!("schema violation sem contexto: {bruto}"))
            }
        }
    }
}
