//! Erros do domínio (valores, nunca panics no caminho normal).

use thiserror::Error;

use crate::kind::ArtifactKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// O rascunho não respeita o esquema do artefato (chaves faltantes,
    /// desconhecidas ou fora de ordem).
    #[error("esquema violado em {artefato}: {campos:?}")]
    EsquemaViolado { artefato: ArtifactKind, campos: Vec<String> },

    /// Seção referenciada não pertence ao esquema do artefato.
    #[error("seção desconhecida em {artefato}: {secao}")]
    SecaoDesconhecida { artefato: ArtifactKind, secao: String },

    /// Sigla de artefato não reconhecida ao fazer parse.
    #[error("artefato inválido: {0}")]
    ArtefatoInvalido(String),
}
