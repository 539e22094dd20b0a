use licita_core::{ChatRequest, GatewayError, LlmGateway, MockGateway};

fn req(sistema: &str, conhecimento: &str, upstream: &str, entrada: &str) -> ChatRequest {
    ChatRequest { sistema: sistema.to_string(),
                  conhecimento: if conhecimento.is_empty() { None } else { Some(conhecimento.to_string()) },
                  contexto_upstream: if upstream.is_empty() { None } else { Some(upstream.to_string()) },
                  entrada_usuario: entrada.to_string(),
                  schema_saida: None }
}

#[test]
fn orcamento_corta_o_conhecimento_primeiro() {
    let mut r = req("sys", &"c".repeat(100), &"u".repeat(50), &"e".repeat(50));
    // total = 3 + 100 + 50 + 50 = 203; orçamento 150 → corta 53 do conhecimento
    r.aplicar_orcamento(150);
    assert_eq!(r.conhecimento.as_deref().map(|s| s.len()), Some(47));
    assert_eq!(r.contexto_upstream.as_deref().map(|s| s.len()), Some(50));
    assert_eq!(r.entrada_usuario.len(), 50);
}

#[test]
fn orcamento_avanca_para_o_upstream_quando_o_conhecimento_acaba() {
    let mut r = req("sys", &"c".repeat(20), &"u".repeat(100), &"e".repeat(50));
    // total = 3 + 20 + 100 + 50 = 173; orçamento 100 → zera conhecimento (20) e corta 53 do upstream
    r.aplicar_orcamento(100);
    assert!(r.conhecimento.is_none(), "conhecimento esgotado vira None");
    assert_eq!(r.contexto_upstream.as_deref().map(|s| s.len()), Some(47));
    assert_eq!(r.entrada_usuario.len(), 50);
}

#[test]
fn entrada_do_usuario_nunca_e_truncada() {
    let mut r = req("sys", "curto", "curto", &"e".repeat(500));
    r.aplicar_orcamento(100);
    assert_eq!(r.entrada_usuario.len(), 500);
    assert!(r.conhecimento.is_none());
    assert!(r.contexto_upstream.is_none());
}

#[test]
fn orcamento_respeita_fronteiras_de_caractere() {
    let mut r = req("", "áéíóú", "", "x");
    r.aplicar_orcamento(4); // 5 chars de conhecimento + 1 de entrada → corta 2 chars
    assert_eq!(r.conhecimento.as_deref(), Some("áéí"));
}

#[tokio::test]
async fn mock_devolve_o_roteiro_em_ordem_e_registra_chamadas() {
    let g = MockGateway::com_respostas([Ok("primeira".to_string()),
                                        Err(GatewayError::Timeout)]);
    let r1 = g.completar(req("s", "", "", "a")).await;
    let r2 = g.completar(req("s", "", "", "b")).await;
    let r3 = g.completar(req("s", "", "", "c")).await;

    assert_eq!(r1.expect("primeira"), "primeira");
    assert!(matches!(r2, Err(GatewayError::Timeout)));
    assert!(matches!(r3, Err(GatewayError::ModelUnavailable(_))), "roteiro esgotado");
    assert_eq!(g.chamadas().len(), 3);
    assert_eq!(g.chamadas()[1].entrada_usuario, "b");
}
