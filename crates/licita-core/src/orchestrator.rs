//! Orquestrador de estágios da jornada.
//!
//! Observa o Artifact Store, recomputa o estado corrente sob demanda
//! (nunca em cache) e aplica a pré-condição de promoção: todo
//! predecessor precisa existir com check rígido 100.

use log::warn;
use serde::Serialize;

use licita_domain::{kind::ORDEM, ArtifactKind, MinimosSecao};

use crate::audit::{AuditEvent, AuditLog, Etapa};
use crate::errors::CoreError;
use crate::store::ArtifactStore;
use crate::validation::rigid_check;

/// Presença/validez de um tipo no store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PresencaKind {
    pub existe: bool,
    pub valido: bool,
    pub score: u8,
    pub faltantes: Vec<String>,
}

/// Estado recomputado da jornada.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageState {
    /// Último tipo com check rígido 100 cujos predecessores também
    /// fecharam em 100; `None` = indeterminado.
    pub estagio_atual: Option<ArtifactKind>,
    /// Um registro por tipo, na ordem canônica da jornada.
    pub por_artefato: Vec<(ArtifactKind, PresencaKind)>,
}

/// Próxima ação recomendada ao usuário.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum NextAction {
    /// O rascunho mais recente não fecha o check rígido: completá-lo.
    Completar { artefato: ArtifactKind, faltantes: Vec<String> },
    /// Produzir o próximo tipo da sequência.
    Produzir(ArtifactKind),
    /// Jornada completa até o contrato.
    Concluida,
}

/// Recomputa o estado usando apenas o check rígido (barato, determinista).
pub fn stage_state<S: ArtifactStore + ?Sized>(store: &S, minimos: &MinimosSecao) -> StageState {
    let mut por_artefato = Vec::with_capacity(ORDEM.len());
    for kind in ORDEM {
        let presenca = match store.get_current(kind) {
            Some(draft) => {
                let relatorio = rigid_check(&draft, minimos);
                PresencaKind { existe: true,
                               valido: relatorio.completo(),
                               score: relatorio.score,
                               faltantes: relatorio.faltantes() }
            }
            None => PresencaKind { existe: false, valido: false, score: 0, faltantes: Vec::new() },
        };
        por_artefato.push((kind, presenca));
    }

    // Estágio atual: prefixo contíguo de tipos válidos a partir do DFD.
    let mut estagio_atual = None;
    for (kind, p) in &por_artefato {
        if p.valido {
            estagio_atual = Some(*kind);
        } else {
            break;
        }
    }

    StageState { estagio_atual, por_artefato }
}

/// Deriva a próxima ação do estado.
pub fn next_action(estado: &StageState) -> NextAction {
    // Rascunho existente mais avançado que ainda não fecha o rígido.
    if let Some((kind, p)) = estado.por_artefato
                                   .iter()
                                   .rev()
                                   .find(|(_, p)| p.existe)
    {
        if !p.valido {
            return NextAction::Completar { artefato: *kind, faltantes: p.faltantes.clone() };
        }
    }
    match estado.estagio_atual {
        Some(ArtifactKind::Contrato) => NextAction::Concluida,
        Some(kind) => NextAction::Produzir(kind.sucessor().unwrap_or(ArtifactKind::Contrato)),
        None => NextAction::Produzir(ArtifactKind::Dfd),
    }
}

/// Promove a versão corrente do tipo: congela um snapshot com origem
/// `promocao` e registra o evento de auditoria.
///
/// Idempotente sobre um store fixo: se a versão corrente já é uma
/// promoção, devolve a versão existente sem gravar nada.
pub fn promote<S, A>(store: &mut S,
                     audit: &mut A,
                     kind: ArtifactKind,
                     minimos: &MinimosSecao)
                     -> Result<u32, CoreError>
    where S: ArtifactStore + ?Sized,
          A: AuditLog + ?Sized
{
    // Pré-condição: todo predecessor presente e com check rígido 100.
    for predecessor in kind.predecessores() {
        match store.get_current(*predecessor) {
            None => {
                return Err(CoreError::PromotionBlocked {
                    predecessor: *predecessor,
                    campos_faltantes: vec!["artefato ausente".to_string()],
                });
            }
            Some(draft) => {
                let relatorio = rigid_check(&draft, minimos);
                if !relatorio.completo() {
                    return Err(CoreError::PromotionBlocked { predecessor: *predecessor,
                                                             campos_faltantes: relatorio.faltantes() });
                }
            }
        }
    }

    let corrente = store.get_current(kind)
                        .ok_or(CoreError::NotFound { artefato: kind, versao: None })?;
    if corrente.origem == "promocao" {
        return Ok(corrente.versao);
    }

    let versao = store.put(kind, corrente, "promocao")?;
    let promovido = store.get_current(kind)
                         .ok_or(CoreError::NotFound { artefato: kind, versao: Some(versao) })?;
    // Auditoria é consultiva: falha não desfaz a promoção.
    if let Err(e) = audit.append(AuditEvent::do_rascunho(&promovido, Etapa::Promocao)) {
        warn!("auditoria de promoção falhou: {e}");
    }
    Ok(versao)
}
