//! Testes do Artifact Store durável: round-trip byte a byte, histórico de
//! versões e tratamento de ausência/corrupção.

use licita_core::{ArtifactStore, CoreError};
use licita_domain::{ArtifactDraft, ArtifactKind, MinimosSecao};
use licita_persistence::{ExportLayout, FsArtifactStore};

fn rascunho_preenchido(kind: ArtifactKind) -> ArtifactDraft {
    let mut d = ArtifactDraft::vazio(kind);
    let secoes: Vec<String> = d.secoes.keys().cloned().collect();
    for (i, nome) in secoes.iter().enumerate() {
        d.secoes[nome] = format!("Conteúdo substantivo da seção {} com detalhe suficiente \
                                  para o mínimo exigido ({i}).",
                                 nome);
    }
    let campos: Vec<String> = d.campos.keys().cloned().collect();
    for nome in campos {
        let valor = format!("valor de {nome}");
        d.campos[&nome] = valor;
    }
    d
}

fn store_em(dir: &std::path::Path) -> FsArtifactStore {
    FsArtifactStore::new(ExportLayout::new(dir.join("exports")), MinimosSecao::default())
        .expect("layout deve ser criável")
}

#[test]
fn roundtrip_byte_a_byte() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut store = store_em(tmp.path());

    let versao = store.put(ArtifactKind::Dfd, rascunho_preenchido(ArtifactKind::Dfd), "extracao")
                      .expect("put deve aceitar rascunho conforme");
    assert_eq!(versao, 1);

    let corrente = store.get_current(ArtifactKind::Dfd).expect("corrente deve existir");
    let versionado = store.get_version(ArtifactKind::Dfd, 1).expect("v1 deve existir");
    assert_eq!(corrente, versionado);
    assert_eq!(corrente.versao, 1);
    assert_eq!(corrente.origem, "extracao");
    assert_eq!(corrente.content_hash.len(), 64);

    // Os dois arquivos carregam exatamente os mesmos bytes.
    let layout = ExportLayout::new(tmp.path().join("exports"));
    let a = std::fs::read(layout.dados_corrente(ArtifactKind::Dfd)).expect("arquivo corrente");
    let b = std::fs::read(layout.arquivo_versao(ArtifactKind::Dfd, 1)).expect("arquivo v1");
    assert_eq!(a, b);
    assert!(a.ends_with(b"\n"));
}

#[test]
fn versoes_crescem_e_o_historico_permanece() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut store = store_em(tmp.path());

    let mut d = rascunho_preenchido(ArtifactKind::Etp);
    assert_eq!(store.put(ArtifactKind::Etp, d.clone(), "extracao").expect("v1"), 1);

    let primeira = d.secoes.keys().next().expect("esquema tem seções").clone();
    d.substituir_secao(&primeira, "Texto revisado com redação ampliada e mais precisa \
                                   sobre a necessidade."
                                                                                     .into())
     .expect("seção do esquema");
    assert_eq!(store.put(ArtifactKind::Etp, d, "refinamento").expect("v2"), 2);

    assert_eq!(store.list_versions(ArtifactKind::Etp), vec![1, 2]);
    let v1 = store.get_version(ArtifactKind::Etp, 1).expect("v1 preservada");
    let v2 = store.get_version(ArtifactKind::Etp, 2).expect("v2 gravada");
    assert_ne!(v1.secoes[&primeira], v2.secoes[&primeira]);
    assert_eq!(store.get_current(ArtifactKind::Etp).expect("corrente").versao, 2);
}

#[test]
fn ausencia_nao_e_erro_no_corrente_e_e_not_found_na_versao() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = store_em(tmp.path());

    assert!(store.get_current(ArtifactKind::Contrato).is_none());
    assert!(store.list_versions(ArtifactKind::Contrato).is_empty());
    let err = store.get_version(ArtifactKind::Contrato, 1).unwrap_err();
    assert!(matches!(err,
                     CoreError::NotFound { artefato: ArtifactKind::Contrato,
                                           versao: Some(1) }));
}

#[test]
fn rascunho_de_tipo_divergente_nao_grava_nada() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut store = store_em(tmp.path());

    let err = store.put(ArtifactKind::Tr, rascunho_preenchido(ArtifactKind::Dfd), "extracao")
                   .unwrap_err();
    assert!(matches!(err, CoreError::Dominio(_)));
    assert!(store.list_versions(ArtifactKind::Tr).is_empty());
    assert!(store.get_current(ArtifactKind::Tr).is_none());
}

#[test]
fn corrente_corrompido_vira_none_sem_panico() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut store = store_em(tmp.path());
    store.put(ArtifactKind::Dfd, rascunho_preenchido(ArtifactKind::Dfd), "extracao")
         .expect("v1");

    let layout = ExportLayout::new(tmp.path().join("exports"));
    std::fs::write(layout.dados_corrente(ArtifactKind::Dfd), "{ não é json").expect("sobrescrita");

    assert!(store.get_current(ArtifactKind::Dfd).is_none());
    // O histórico versionado segue íntegro.
    assert!(store.get_version(ArtifactKind::Dfd, 1).is_ok());
}

#[test]
fn normalizacao_acontece_na_gravacao() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut store = store_em(tmp.path());

    let mut d = rascunho_preenchido(ArtifactKind::Dfd);
    let primeira = d.secoes.keys().next().expect("esquema tem seções").clone();
    d.secoes[&primeira] = "Linha com retorno\r\ne espaço à direita   \r\n".to_string();
    store.put(ArtifactKind::Dfd, d, "extracao").expect("v1");

    let corrente = store.get_current(ArtifactKind::Dfd).expect("corrente");
    assert_eq!(corrente.secoes[&primeira], "Linha com retorno\ne espaço à direita");
}
