//! licita-persistence
//!
//! Implementações duráveis (sistema de arquivos) dos contratos do core:
//! - `fs_store`: Artifact Store com escrita atômica (temp + rename) e
//!   histórico de versões por tipo.
//! - `fs_audit`: journal de auditoria JSONL particionado por dia.
//! - `snapshots`: fotografias de métricas (JSON + CSV) e relatórios.
//! - `layout`: o layout `exports/` persistido.
//!
//! Módulos seguem o contrato: gravações atômicas, ordenação explícita de
//! listagens, nada de estado parcial visível após falha.

pub mod error;
pub mod fs_audit;
pub mod fs_store;
pub mod layout;
pub mod snapshots;

pub use error::PersistenceError;
pub use fs_audit::FsAuditLog;
pub use fs_store::FsArtifactStore;
pub use layout::ExportLayout;
