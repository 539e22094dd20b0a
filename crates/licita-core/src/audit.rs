//! Diário de auditoria append-only.
//!
//! Cada extração, validação, refinamento, exportação e promoção emite um
//! registro imutável com métricas e o prefixo do hash de conteúdo. O
//! journal persistido é particionado por dia-calendário; a implementação
//! em memória serve ao core e aos testes.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use licita_domain::{ArtifactDraft, ArtifactKind};

use crate::errors::CoreError;
use crate::hashing::prefixo16;

/// Etapa da jornada que originou o evento.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Etapa {
    Extracao,
    Validacao,
    Refinamento,
    Exportacao,
    Promocao,
}

impl Etapa {
    pub fn slug(&self) -> &'static str {
        match self {
            Etapa::Extracao => "extracao",
            Etapa::Validacao => "validacao",
            Etapa::Refinamento => "refinamento",
            Etapa::Exportacao => "exportacao",
            Etapa::Promocao => "promocao",
        }
    }
}

/// Registro imutável do journal. Não há caminho de atualização.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub artefato: ArtifactKind,
    pub etapa: Etapa,
    pub word_count: usize,
    pub char_count: usize,
    /// Prefixo de 16 hex do sha-256 do corpo canônico.
    pub sha256: String,
}

impl AuditEvent {
    /// Evento derivado de um rascunho, com timestamp de agora.
    pub fn do_rascunho(draft: &ArtifactDraft, etapa: Etapa) -> Self {
        Self { timestamp: Utc::now(),
               artefato: draft.artefato,
               etapa,
               word_count: draft.palavras(),
               char_count: draft.caracteres(),
               sha256: prefixo16(&draft.content_hash) }
    }
}

/// Agregado de uma janela do journal.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AuditAggregate {
    pub total: usize,
    pub por_artefato: BTreeMap<String, usize>,
    pub por_etapa: BTreeMap<String, usize>,
}

/// Journal durável append-only.
pub trait AuditLog {
    /// Acrescenta um registro; implementações duráveis fazem flush antes
    /// de retornar. Falha de auditoria é consultiva para o chamador.
    fn append(&mut self, evento: AuditEvent) -> Result<(), CoreError>;

    /// Eventos na janela `[de, ate]` (datas-calendário, UTC), em ordem de
    /// append por dia.
    fn read_range(&self, de: NaiveDate, ate: NaiveDate) -> Result<Vec<AuditEvent>, CoreError>;

    /// Remove partições mais antigas que o horizonte; devolve quantas
    /// foram descartadas. Dentro do horizonte nada é reescrito.
    fn prune(&mut self, horizonte_dias: u32, hoje: NaiveDate) -> Result<usize, CoreError>;

    /// Agrega totais por artefato e por etapa na janela.
    fn aggregate(&self, de: NaiveDate, ate: NaiveDate) -> Result<AuditAggregate, CoreError> {
        let eventos = self.read_range(de, ate)?;
        let mut agg = AuditAggregate { total: eventos.len(), ..Default::default() };
        for ev in &eventos {
            *agg.por_artefato.entry(ev.artefato.sigla().to_string()).or_insert(0) += 1;
            *agg.por_etapa.entry(ev.etapa.slug().to_string()).or_insert(0) += 1;
        }
        Ok(agg)
    }
}

/// Journal em memória (testes e execuções efêmeras).
#[derive(Default)]
pub struct InMemoryAuditLog {
    eventos: Vec<AuditEvent>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[AuditEvent] {
        &self.eventos
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&mut self, evento: AuditEvent) -> Result<(), CoreError> {
        self.eventos.push(evento);
        Ok(())
    }

    fn read_range(&self, de: NaiveDate, ate: NaiveDate) -> Result<Vec<AuditEvent>, CoreError> {
        Ok(self.eventos
               .iter()
               .filter(|e| {
                   let dia = e.timestamp.date_naive();
                   dia >= de && dia <= ate
               })
               .cloned()
               .collect())
    }

    fn prune(&mut self, horizonte_dias: u32, hoje: NaiveDate) -> Result<usize, CoreError> {
        let limite = hoje - chrono::Duration::days(horizonte_dias as i64);
        let antes = self.eventos.len();
        self.eventos.retain(|e| e.timestamp.date_naive() >= limite);
        Ok(antes - self.eventos.len())
    }
}
