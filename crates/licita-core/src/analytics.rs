//! Métricas de governança derivadas do store e da auditoria.
//!
//! Observacional por definição: nada aqui alimenta a correção do fluxo.
//! Snapshots são escritos pela camada de persistência (JSON + CSV).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use licita_domain::{kind::ORDEM, ArtifactKind, MinimosSecao};

use crate::audit::AuditLog;
use crate::coherence::CoherenceReport;
use crate::errors::CoreError;
use crate::store::ArtifactStore;
use crate::validation::rigid_check;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusConformidade {
    Completo,
    Incompleto,
    Ausente,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Conformidade {
    /// Share de artefatos correntes com check rígido 100.
    pub percentual: f64,
    pub completos: usize,
    pub incompletos: usize,
    pub ausentes: usize,
    pub por_artefato: Vec<(ArtifactKind, StatusConformidade)>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Alerta {
    /// Rascunho corrente sem atualização há mais dias que o limiar.
    Desatualizado { artefato: ArtifactKind, dias: i64 },
    Incompleto { artefato: ArtifactKind, faltantes: Vec<String> },
    Incoerencia { descricao: String },
}

/// Fotografia timestampada das métricas.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub gerado_em: DateTime<Utc>,
    pub conformidade: Conformidade,
    /// Média de dias entre o primeiro evento de DFD e o último de
    /// CONTRATO, quando a jornada tem os cinco tipos.
    pub tramitacao_dias_media: Option<f64>,
    pub score_coerencia: u8,
    pub alertas: Vec<Alerta>,
}

pub fn conformidade<S: ArtifactStore + ?Sized>(store: &S, minimos: &MinimosSecao) -> Conformidade {
    let mut por_artefato = Vec::with_capacity(ORDEM.len());
    let (mut completos, mut incompletos, mut ausentes) = (0usize, 0usize, 0usize);
    for kind in ORDEM {
        let status = match store.get_current(kind) {
            Some(draft) if rigid_check(&draft, minimos).completo() => {
                completos += 1;
                StatusConformidade::Completo
            }
            Some(_) => {
                incompletos += 1;
                StatusConformidade::Incompleto
            }
            None => {
                ausentes += 1;
                StatusConformidade::Ausente
            }
        };
        por_artefato.push((kind, status));
    }
    Conformidade { percentual: 100.0 * completos as f64 / ORDEM.len() as f64,
                   completos,
                   incompletos,
                   ausentes,
                   por_artefato }
}

/// Dias de tramitação da jornada, medidos pela auditoria. `None` quando
/// algum dos cinco tipos ainda não existe ou não há eventos das pontas.
pub fn tramitacao_dias<S, A>(store: &S, audit: &A, de: NaiveDate, ate: NaiveDate)
                             -> Result<Option<f64>, CoreError>
    where S: ArtifactStore + ?Sized,
          A: AuditLog + ?Sized
{
    if ORDEM.iter().any(|k| store.get_current(*k).is_none()) {
        return Ok(None);
    }
    let eventos = audit.read_range(de, ate)?;
    let inicio = eventos.iter()
                        .filter(|e| e.artefato == ArtifactKind::Dfd)
                        .map(|e| e.timestamp)
                        .min();
    let fim = eventos.iter()
                     .filter(|e| e.artefato == ArtifactKind::Contrato)
                     .map(|e| e.timestamp)
                     .max();
    Ok(match (inicio, fim) {
        (Some(i), Some(f)) if f >= i => Some((f - i).num_seconds() as f64 / 86_400.0),
        _ => None,
    })
}

/// Gera a fotografia completa de métricas e alertas.
pub fn gerar_snapshot<S, A>(store: &S,
                            audit: &A,
                            coerencia: &CoherenceReport,
                            minimos: &MinimosSecao,
                            stale_dias: i64,
                            agora: DateTime<Utc>)
                            -> Result<Snapshot, CoreError>
    where S: ArtifactStore + ?Sized,
          A: AuditLog + ?Sized
{
    let conf = conformidade(store, minimos);
    let mut alertas = Vec::new();

    for kind in ORDEM {
        if let Some(draft) = store.get_current(kind) {
            let dias = (agora - draft.atualizado_em).num_days();
            if dias > stale_dias {
                alertas.push(Alerta::Desatualizado { artefato: kind, dias });
            }
            let relatorio = rigid_check(&draft, minimos);
            if !relatorio.completo() {
                alertas.push(Alerta::Incompleto { artefato: kind,
                                                  faltantes: relatorio.faltantes() });
            }
        }
    }
    for descricao in &coerencia.discrepancias {
        alertas.push(Alerta::Incoerencia { descricao: descricao.clone() });
    }

    let janela_inicio = agora.date_naive() - chrono::Duration::days(3650);
    let tramitacao = tramitacao_dias(store, audit, janela_inicio, agora.date_naive())?;

    Ok(Snapshot { gerado_em: agora,
                  conformidade: conf,
                  tramitacao_dias_media: tramitacao,
                  score_coerencia: coerencia.score_consolidado,
                  alertas })
}

/// Rendição CSV simples (`metrica,valor` por linha) para a fotografia.
pub fn snapshot_csv(snapshot: &Snapshot) -> String {
    let mut linhas = vec!["metrica,valor".to_string()];
    linhas.push(format!("gerado_em,{}", snapshot.gerado_em.to_rfc3339()));
    linhas.push(format!("conformidade_percentual,{:.1}", snapshot.conformidade.percentual));
    linhas.push(format!("completos,{}", snapshot.conformidade.completos));
    linhas.push(format!("incompletos,{}", snapshot.conformidade.incompletos));
    linhas.push(format!("ausentes,{}", snapshot.conformidade.ausentes));
    linhas.push(format!("score_coerencia,{}", snapshot.score_coerencia));
    linhas.push(format!("tramitacao_dias_media,{}",
                        snapshot.tramitacao_dias_media
                                .map(|d| format!("{d:.1}"))
                                .unwrap_or_else(|| "n/d".to_string())));
    linhas.push(format!("alertas,{}", snapshot.alertas.len()));
    linhas.join("\n") + "\n"
}
