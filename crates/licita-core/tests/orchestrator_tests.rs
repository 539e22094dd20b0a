use licita_core::{next_action, promote, stage_state, ArtifactStore, AuditLog, CoreError, Etapa,
                  InMemoryArtifactStore, InMemoryAuditLog, NextAction};
use licita_domain::{ArtifactDraft, ArtifactKind, MinimosSecao};

fn preenchido(kind: ArtifactKind) -> ArtifactDraft {
    let mut d = ArtifactDraft::vazio(kind);
    for v in d.campos.values_mut() {
        *v = "Divisão de Suprimentos".to_string();
    }
    for v in d.secoes.values_mut() {
        *v = "Texto com comprimento suficiente para fechar o check rígido da seção.".to_string();
    }
    d
}

fn incompleto(kind: ArtifactKind) -> ArtifactDraft {
    let mut d = preenchido(kind);
    let primeira = d.secoes.keys().next().cloned().expect("ao menos uma seção");
    d.secoes.insert(primeira, String::new());
    d
}

#[test]
fn store_vazio_e_indeterminado_e_pede_dfd() {
    let store = InMemoryArtifactStore::default();
    let estado = stage_state(&store, &MinimosSecao::default());
    assert_eq!(estado.estagio_atual, None);
    assert_eq!(next_action(&estado), NextAction::Produzir(ArtifactKind::Dfd));
}

#[test]
fn estagio_e_o_prefixo_contiguo_de_artefatos_rigidos() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "manual").expect("dfd");
    store.put(ArtifactKind::Etp, preenchido(ArtifactKind::Etp), "manual").expect("etp");

    let estado = stage_state(&store, &minimos);
    assert_eq!(estado.estagio_atual, Some(ArtifactKind::Etp));
    assert_eq!(next_action(&estado), NextAction::Produzir(ArtifactKind::Tr));
}

#[test]
fn rascunho_mais_recente_incompleto_pede_complemento() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "manual").expect("dfd");
    store.put(ArtifactKind::Etp, incompleto(ArtifactKind::Etp), "manual").expect("etp");

    let estado = stage_state(&store, &minimos);
    assert_eq!(estado.estagio_atual, Some(ArtifactKind::Dfd));
    match next_action(&estado) {
        NextAction::Completar { artefato, faltantes } => {
            assert_eq!(artefato, ArtifactKind::Etp);
            assert!(!faltantes.is_empty());
        }
        outra => panic!("esperava Completar, veio {outra:?}"),
    }
}

#[test]
fn lacuna_no_meio_da_jornada_trava_o_estagio() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "manual").expect("dfd");
    // ETP ausente; TR presente e completo.
    store.put(ArtifactKind::Tr, preenchido(ArtifactKind::Tr), "manual").expect("tr");

    let estado = stage_state(&store, &minimos);
    assert_eq!(estado.estagio_atual, Some(ArtifactKind::Dfd),
               "TR completo não conta sem o ETP");
}

#[test]
fn promocao_bloqueada_por_predecessor_incompleto() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    let mut audit = InMemoryAuditLog::new();
    store.put(ArtifactKind::Dfd, incompleto(ArtifactKind::Dfd), "manual").expect("dfd");
    store.put(ArtifactKind::Etp, preenchido(ArtifactKind::Etp), "manual").expect("etp");
    let versoes_antes = store.list_versions(ArtifactKind::Etp);

    let err = promote(&mut store, &mut audit, ArtifactKind::Etp, &minimos).unwrap_err();
    match err {
        CoreError::PromotionBlocked { predecessor, campos_faltantes } => {
            assert_eq!(predecessor, ArtifactKind::Dfd);
            assert!(!campos_faltantes.is_empty());
        }
        outro => panic!("esperava PromotionBlocked, veio {outro:?}"),
    }
    // Sem evento de promoção e sem nova versão.
    assert!(audit.todos().iter().all(|e| e.etapa != Etapa::Promocao));
    assert_eq!(store.list_versions(ArtifactKind::Etp), versoes_antes);
}

#[test]
fn promocao_sem_rascunho_corrente_da_not_found() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    let mut audit = InMemoryAuditLog::new();
    let err = promote(&mut store, &mut audit, ArtifactKind::Dfd, &minimos).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { artefato: ArtifactKind::Dfd, .. }));
}

#[test]
fn promocao_congela_snapshot_e_registra_auditoria() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    let mut audit = InMemoryAuditLog::new();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "extracao").expect("dfd");

    let versao = promote(&mut store, &mut audit, ArtifactKind::Dfd, &minimos).expect("promover");
    assert_eq!(versao, 2, "promoção grava nova versão");

    let atual = store.get_current(ArtifactKind::Dfd).expect("corrente");
    assert_eq!(atual.origem, "promocao");
    assert_eq!(audit.todos().len(), 1);
    assert_eq!(audit.todos()[0].etapa, Etapa::Promocao);
}

#[test]
fn promocao_e_idempotente_sobre_store_fixo() {
    let minimos = MinimosSecao::default();
    let mut store = InMemoryArtifactStore::default();
    let mut audit = InMemoryAuditLog::new();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "extracao").expect("dfd");

    let v1 = promote(&mut store, &mut audit, ArtifactKind::Dfd, &minimos).expect("promover");
    let v2 = promote(&mut store, &mut audit, ArtifactKind::Dfd, &minimos).expect("repromover");
    assert_eq!(v1, v2, "repromover sem mudança devolve a mesma versão");
    assert_eq!(audit.todos().len(), 1, "sem evento duplicado");
    assert_eq!(store.list_versions(ArtifactKind::Dfd).len(), 2);
}
