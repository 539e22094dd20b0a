use licita_core::validation::interpretar_semantico;
use licita_core::{rigid_check, semantic_check, validate, AppConfig, ArtifactStore,
                  InMemoryArtifactStore, MockGateway, SemanticOutcome};
use licita_domain::{ArtifactDraft, ArtifactKind, MinimosSecao};
use serde_json::json;

fn preenchido(kind: ArtifactKind) -> ArtifactDraft {
    let mut d = ArtifactDraft::vazio(kind);
    for v in d.campos.values_mut() {
        *v = "Coordenadoria de Logística".to_string();
    }
    for v in d.secoes.values_mut() {
        *v = "Texto com comprimento suficiente para o mínimo exigido pela política.".to_string();
    }
    d
}

#[test]
fn check_rigido_e_determinista() {
    let minimos = MinimosSecao::default();
    let d = preenchido(ArtifactKind::Tr);
    let r1 = rigid_check(&d, &minimos);
    let r2 = rigid_check(&d, &minimos);
    assert_eq!(r1, r2);
    assert_eq!(r1.score, 100);
    assert!(r1.faltantes().is_empty());
}

#[test]
fn score_reflete_a_fracao_de_campos_presentes() {
    let minimos = MinimosSecao::default();
    let mut d = preenchido(ArtifactKind::Tr);
    d.secoes.insert("Riscos".to_string(), String::new());
    d.campos.insert("prazo".to_string(), String::new());
    let r = rigid_check(&d, &minimos);
    // TR: 4 campos + 9 seções = 13 exigidos; 2 reprovados.
    assert_eq!(r.itens.len(), 13);
    assert_eq!(r.score, (100 * 11 / 13) as u8);
    assert_eq!(r.faltantes(), vec!["prazo".to_string(), "Riscos".to_string()]);
}

#[test]
fn rigido_100_implica_gaps_vazio() {
    let mut store = InMemoryArtifactStore::default();
    store.put(ArtifactKind::Dfd, preenchido(ArtifactKind::Dfd), "manual").expect("put");
    let atual = store.get_current(ArtifactKind::Dfd).expect("corrente");
    let r = rigid_check(&atual, &MinimosSecao::default());
    assert_eq!(r.score, 100);
    assert!(atual.gaps.is_empty(), "rigid 100 ⟹ sem gaps");
}

#[tokio::test]
async fn semantico_com_json_estrito() {
    let resposta = json!({
        "score": 82,
        "recomendacoes": ["Detalhar a estimativa de custos", "Citar o dispositivo legal"],
        "guided_markdown": "# TR revisado\n..."
    });
    let gateway = MockGateway::com_respostas([Ok(resposta.to_string())]);
    let config = AppConfig::default();
    let d = preenchido(ArtifactKind::Tr);

    let saida = semantic_check(&gateway, &config, &d).await.expect("check");
    match saida {
        SemanticOutcome::Avaliado(rel) => {
            assert_eq!(rel.score, 82);
            assert_eq!(rel.recomendacoes.len(), 2);
            assert!(rel.guided_markdown.is_some());
        }
        outro => panic!("esperava Avaliado, veio {outro:?}"),
    }
}

#[test]
fn semantico_leniente_extrai_score_e_bullets() {
    let bruto = "Avaliação geral: 85 pontos.\n\
                 - Ampliar a justificativa legal\n\
                 * Incluir métricas de resultado\n\
                 Texto solto que não é bullet.";
    match interpretar_semantico(bruto) {
        SemanticOutcome::Avaliado(rel) => {
            assert_eq!(rel.score, 85);
            assert_eq!(rel.recomendacoes,
                       vec!["Ampliar a justificativa legal".to_string(),
                            "Incluir métricas de resultado".to_string()]);
            assert!(rel.guided_markdown.is_none());
        }
        outro => panic!("esperava Avaliado, veio {outro:?}"),
    }
}

#[test]
fn semantico_ilegivel_degrada_com_o_texto_cru_anexado() {
    let bruto = "não há nota aqui, somente prosa sem números utilizáveis";
    match interpretar_semantico(bruto) {
        SemanticOutcome::Indisponivel { bruto: anexo } => assert_eq!(anexo, bruto),
        outro => panic!("esperava Indisponivel, veio {outro:?}"),
    }
}

#[tokio::test]
async fn rodada_de_validacao_produz_relatorio_completo() {
    let resposta = json!({"score": 90, "recomendacoes": ["Citar o dispositivo legal"]});
    let gateway = MockGateway::com_respostas([Ok(resposta.to_string())]);
    let config = AppConfig::default();
    let d = preenchido(ArtifactKind::Etp);

    let antes = chrono::Utc::now();
    let relatorio = validate(Some(&gateway), &config, &d).await;

    assert_eq!(relatorio.rigido.score, 100);
    match &relatorio.semantico {
        Some(SemanticOutcome::Avaliado(rel)) => assert_eq!(rel.score, 90),
        outro => panic!("esperava semântico avaliado, veio {outro:?}"),
    }
    assert!(relatorio.avaliado_em >= antes);
}

#[tokio::test]
async fn sem_gateway_a_rodada_fica_so_com_o_rigido() {
    let config = AppConfig::default();
    let d = preenchido(ArtifactKind::Dfd);

    let relatorio = validate(None::<&MockGateway>, &config, &d).await;
    assert_eq!(relatorio.rigido.score, 100);
    assert!(relatorio.semantico.is_none());
}

#[tokio::test]
async fn falha_do_gateway_nao_derruba_a_rodada() {
    use licita_core::GatewayError;
    let gateway =
        MockGateway::com_respostas([Err(GatewayError::Transport("rede fora".to_string()))]);
    let config = AppConfig::default();
    let d = preenchido(ArtifactKind::Tr);

    let relatorio = validate(Some(&gateway), &config, &d).await;
    assert_eq!(relatorio.rigido.score, 100, "rígido independe do modelo");
    assert!(relatorio.semantico.is_none(), "semântico degrada para ausente");
}

#[test]
fn score_fora_da_faixa_e_clampado() {
    let resposta = json!({"score": 250, "recomendacoes": []});
    match interpretar_semantico(&resposta.to_string()) {
        SemanticOutcome::Avaliado(rel) => assert_eq!(rel.score, 100),
        outro => panic!("esperava Avaliado, veio {outro:?}"),
    }
}
