//! Erros de persistência, mapeados a variantes semânticas.

use thiserror::Error;

use licita_core::CoreError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io: {0}")]
    Io(String),
    #[error("conteúdo corrompido em {caminho}: {motivo}")]
    Corrupto { caminho: String, motivo: String },
    #[error("não encontrado: {0}")]
    NaoEncontrado(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<PersistenceError> for CoreError {
    fn from(err: PersistenceError) -> Self {
        CoreError::Persistencia(err.to_string())
    }
}
