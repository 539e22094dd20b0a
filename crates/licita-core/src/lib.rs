//! licita-core: núcleo do pipeline de artefatos da contratação pública.
//!
//! Três subsistemas acoplados sobre colaboradores explícitos
//! `(store, audit, gateway, config)`:
//! - motor de extração estruturada e refinamento (`extraction`);
//! - motor de validação e coerência (`validation`, `coherence`);
//! - orquestrador de estágios (`orchestrator`).
//!
//! Em volta: store e auditoria como traits com implementações em memória
//! (as duráveis vivem em licita-persistence), gateway de LLM como ponto
//! único de acesso ao modelo, carregador de conhecimento, métricas.

pub mod analytics;
pub mod audit;
pub mod coherence;
pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod gateway;
pub mod hashing;
pub mod knowledge;
pub mod orchestrator;
pub mod store;
pub mod validation;

pub use audit::{AuditAggregate, AuditEvent, AuditLog, Etapa, InMemoryAuditLog};
pub use config::AppConfig;
pub use errors::CoreError;
pub use extraction::{ExtractionEngine, ExtractionResult, InstrucaoRapida};
pub use gateway::{ChatRequest, GatewayError, LlmGateway, MockGateway};
pub use knowledge::KnowledgeLoader;
pub use orchestrator::{next_action, promote, stage_state, NextAction, StageState};
pub use store::{ArtifactStore, InMemoryArtifactStore};
pub use validation::{rigid_check, semantic_check, validate, RigidReport, SemanticOutcome,
                     SemanticReport, ValidationReport};
