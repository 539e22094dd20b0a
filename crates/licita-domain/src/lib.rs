//! licita-domain: tipos de domínio da fase interna da contratação
//! (Lei 14.133/2021).
//!
//! - `ArtifactKind`: os cinco artefatos sequenciais (DFD → ETP → TR →
//!   EDITAL → CONTRATO).
//! - `ArtifactSchema`: lista ordenada de seções + campos administrativos
//!   por tipo (estática, versionada com o código).
//! - `ArtifactDraft`: instância tipada de um artefato, com derivados
//!   (`narrativa`, `gaps`) recomputáveis de forma determinista.
//!
//! O crate não faz IO nem conhece LLM; apenas valores e validações.

pub mod draft;
pub mod error;
pub mod kind;
pub mod schema;

pub use draft::{ArtifactDraft, MinimosSecao};
pub use error::DomainError;
pub use kind::ArtifactKind;
pub use schema::{schema_de, ArtifactSchema};
