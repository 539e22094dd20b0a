//! CLI `licita`: jornada DFD → ETP → TR → EDITAL → CONTRATO.
//!
//! Subcomandos:
//! - `extrair <tipo> (--arquivo <PATH> | --texto <TXT>)`
//! - `refinar <tipo> --secao <NOME> (--instrucao <TXT> | --rapida <ID>)`
//! - `validar <tipo> [--semantico]`
//! - `promover <tipo>`
//! - `status` / `coerencia` / `analises` / `exportar <tipo>`
//! - `prune-auditoria`
//!
//! Códigos de saída: 0 ok, 2 uso, 3 entrada inválida, 4 estado/ausência,
//! 5 falha de backend (modelo ou persistência).

use std::process::exit;

use chrono::Utc;
use log::warn;

use licita_core::export::markdown_do_rascunho;
use licita_core::{coherence, AppConfig, ArtifactStore, AuditEvent, AuditLog, CoreError, Etapa,
                  ExtractionEngine, InstrucaoRapida, KnowledgeLoader, SemanticOutcome};
use licita_domain::{ArtifactDraft, ArtifactKind};
use licita_persistence::snapshots;
use licita_persistence::{ExportLayout, FsArtifactStore, FsAuditLog};
use licita_providers::OpenAiGateway;

fn uso() -> ! {
    eprintln!("Uso: licita <extrair|refinar|validar|promover|status|coerencia|analises|exportar|\
               prune-auditoria> ...");
    exit(2);
}

/// Valor do flag `--nome` na lista de argumentos, se presente.
fn flag(args: &[String], nome: &str) -> Option<String> {
    args.iter().position(|a| a == nome).and_then(|i| args.get(i + 1).cloned())
}

fn tipo_ou_sai(args: &[String]) -> ArtifactKind {
    let bruto = match args.first() {
        Some(t) => t,
        None => uso(),
    };
    match bruto.parse() {
        Ok(kind) => kind,
        Err(_) => {
            eprintln!("[licita] tipo de artefato desconhecido: {bruto} (use dfd, etp, tr, \
                       edital ou contrato)");
            exit(3);
        }
    }
}

struct Ambiente {
    config: AppConfig,
    store: FsArtifactStore,
    audit: FsAuditLog,
    layout: ExportLayout,
}

fn ambiente() -> Ambiente {
    let config = AppConfig::from_env();
    let layout = ExportLayout::new(config.exports_dir.clone());
    let store = match FsArtifactStore::new(layout.clone(), config.minimos.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[licita] falha ao preparar {}: {e}", config.exports_dir.display());
            exit(5);
        }
    };
    let audit = match FsAuditLog::new(layout.clone()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("[licita] falha ao abrir auditoria: {e}");
            exit(5);
        }
    };
    Ambiente { config, store, audit, layout }
}

fn gateway_ou_sai(config: &AppConfig) -> OpenAiGateway {
    match OpenAiGateway::from_config(config) {
        Some(g) => g,
        None => {
            eprintln!("[licita] OPENAI_API_KEY ausente: operação assistida por IA indisponível. \
                       Comandos sem IA (status, validar, promover, exportar) seguem operando.");
            exit(4);
        }
    }
}

/// Rascunhos correntes dos predecessores do tipo, na ordem da jornada.
fn upstream_de(store: &FsArtifactStore, kind: ArtifactKind) -> Vec<ArtifactDraft> {
    kind.predecessores().iter().filter_map(|p| store.get_current(*p)).collect()
}

fn registrar(audit: &mut FsAuditLog, draft: &ArtifactDraft, etapa: Etapa) {
    // Auditoria é consultiva: falha não desfaz a operação principal.
    if let Err(e) = audit.append(AuditEvent::do_rascunho(draft, etapa)) {
        warn!("auditoria falhou: {e}");
    }
}

fn sair_por_erro(contexto: &str, e: CoreError) -> ! {
    eprintln!("[licita {contexto}] {e}");
    let codigo = match e {
        CoreError::EntradaVazia | CoreError::SchemaViolation { .. } => 3,
        CoreError::NotFound { .. } | CoreError::PromotionBlocked { .. } => 4,
        _ => 5,
    };
    exit(codigo);
}

async fn cmd_extrair(env: &mut Ambiente, args: &[String]) {
    let kind = tipo_ou_sai(args);
    let texto = match (flag(args, "--arquivo"), flag(args, "--texto")) {
        (Some(caminho), _) => match std::fs::read_to_string(&caminho) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("[licita extrair] não consegui ler {caminho}: {e}");
                exit(3);
            }
        },
        (None, Some(t)) => t,
        (None, None) => {
            eprintln!("Uso: licita extrair <tipo> (--arquivo <PATH> | --texto <TXT>)");
            exit(2);
        }
    };

    let gateway = gateway_ou_sai(&env.config);
    let conhecimento = KnowledgeLoader::new(env.config.base_conhecimento.clone())
        .carregar(env.config.max_contexto_chars / 2);
    let upstream = upstream_de(&env.store, kind);

    let engine = ExtractionEngine::new(&gateway, &env.config);
    let draft = match engine.extract(kind, &texto, &upstream, conhecimento).await {
        Ok(d) => d,
        Err(e) => sair_por_erro("extrair", e),
    };
    let versao = match env.store.put(kind, draft, "extracao") {
        Ok(v) => v,
        Err(e) => sair_por_erro("extrair", e),
    };
    if let Some(gravado) = env.store.get_current(kind) {
        registrar(&mut env.audit, &gravado, Etapa::Extracao);
        if !gravado.gaps.is_empty() {
            println!("lacunas: {}", gravado.gaps.join("; "));
        }
    }
    println!("{} v{versao} gravado", kind.sigla());
}

fn instrucao_de(args: &[String]) -> Option<String> {
    if let Some(livre) = flag(args, "--instrucao") {
        return Some(livre);
    }
    let id = flag(args, "--rapida")?;
    let rapida = match id.as_str() {
        "detalhe-tecnico" => InstrucaoRapida::DetalheTecnico,
        "metricas" => InstrucaoRapida::MetricasQuantitativas,
        "fundamentacao-legal" => InstrucaoRapida::FundamentacaoLegal,
        "objetivo" => InstrucaoRapida::MaisObjetivo,
        outro => {
            eprintln!("[licita refinar] instrução rápida desconhecida: {outro} (use \
                       detalhe-tecnico, metricas, fundamentacao-legal ou objetivo)");
            exit(3);
        }
    };
    Some(rapida.texto().to_string())
}

async fn cmd_refinar(env: &mut Ambiente, args: &[String]) {
    let kind = tipo_ou_sai(args);
    let secao = match flag(args, "--secao") {
        Some(s) => s,
        None => {
            eprintln!("Uso: licita refinar <tipo> --secao <NOME> (--instrucao <TXT> | --rapida \
                       <ID>)");
            exit(2);
        }
    };
    let instrucao = match instrucao_de(args) {
        Some(i) => i,
        None => {
            eprintln!("Uso: licita refinar <tipo> --secao <NOME> (--instrucao <TXT> | --rapida \
                       <ID>)");
            exit(2);
        }
    };

    let corrente = match env.store.get_current(kind) {
        Some(d) => d,
        None => {
            eprintln!("[licita refinar] não há {} corrente para refinar", kind.sigla());
            exit(4);
        }
    };

    let gateway = gateway_ou_sai(&env.config);
    let engine = ExtractionEngine::new(&gateway, &env.config);
    let refinado = match engine.refine_section(&corrente, &secao, &instrucao).await {
        Ok(d) => d,
        Err(e) => sair_por_erro("refinar", e),
    };
    let versao = match env.store.put(kind, refinado, "refinamento") {
        Ok(v) => v,
        Err(e) => sair_por_erro("refinar", e),
    };
    if let Some(gravado) = env.store.get_current(kind) {
        registrar(&mut env.audit, &gravado, Etapa::Refinamento);
    }
    println!("{} v{versao}: seção \"{secao}\" refinada", kind.sigla());
}

async fn cmd_validar(env: &mut Ambiente, args: &[String]) {
    let kind = tipo_ou_sai(args);
    let draft = match env.store.get_current(kind) {
        Some(d) => d,
        None => {
            eprintln!("[licita validar] não há {} corrente", kind.sigla());
            exit(4);
        }
    };

    let com_semantico = args.iter().any(|a| a == "--semantico");
    let gateway = if com_semantico { OpenAiGateway::from_config(&env.config) } else { None };
    let relatorio = licita_core::validate(gateway.as_ref(), &env.config, &draft).await;

    println!("check rígido: {}/100", relatorio.rigido.score);
    for faltante in relatorio.rigido.faltantes() {
        println!("  falta: {faltante}");
    }
    match &relatorio.semantico {
        Some(SemanticOutcome::Avaliado(rel)) => {
            println!("check semântico: {}/100", rel.score);
            for rec in &rel.recomendacoes {
                println!("  recomendação: {rec}");
            }
        }
        Some(SemanticOutcome::Indisponivel { .. }) => {
            println!("check semântico: resposta ininterpretável (consultivo; o rígido decide)");
        }
        None if com_semantico => {
            println!("check semântico: pulado (OPENAI_API_KEY ausente ou modelo fora)");
        }
        None => {}
    }

    registrar(&mut env.audit, &draft, Etapa::Validacao);
    exit(if relatorio.rigido.completo() { 0 } else { 4 });
}

fn cmd_promover(env: &mut Ambiente, args: &[String]) {
    let kind = tipo_ou_sai(args);
    let minimos = env.config.minimos.clone();
    match licita_core::promote(&mut env.store, &mut env.audit, kind, &minimos) {
        Ok(versao) => println!("{} promovido (v{versao})", kind.sigla()),
        Err(e) => sair_por_erro("promover", e),
    }
}

fn cmd_status(env: &Ambiente) {
    let estado = licita_core::stage_state(&env.store, &env.config.minimos);
    for (kind, p) in &estado.por_artefato {
        let situacao = if !p.existe {
            "ausente".to_string()
        } else if p.valido {
            format!("ok ({}/100)", p.score)
        } else {
            format!("incompleto ({}/100): {}", p.score, p.faltantes.join(", "))
        };
        println!("{:<9} {situacao}", kind.sigla());
    }
    match licita_core::next_action(&estado) {
        licita_core::NextAction::Completar { artefato, faltantes } => {
            println!("próxima ação: completar {} ({})", artefato.sigla(), faltantes.join(", "));
        }
        licita_core::NextAction::Produzir(kind) => {
            println!("próxima ação: produzir {}", kind.sigla());
        }
        licita_core::NextAction::Concluida => println!("jornada concluída"),
    }
}

fn cmd_coerencia(env: &Ambiente) {
    let relatorio = coherence::coherence_scan(&env.store);
    println!("coerência consolidada: {}/100", relatorio.score_consolidado);
    for par in &relatorio.pares {
        println!("  {}→{}: {}/100", par.de.sigla(), par.para.sigla(), par.score);
    }
    for d in &relatorio.discrepancias {
        println!("  ⚠ {d}");
    }
}

fn cmd_analises(env: &Ambiente) {
    let coerencia = coherence::coherence_scan(&env.store);
    let snapshot = match licita_core::analytics::gerar_snapshot(&env.store,
                                                                &env.audit,
                                                                &coerencia,
                                                                &env.config.minimos,
                                                                env.config.stale_dias,
                                                                Utc::now())
    {
        Ok(s) => s,
        Err(e) => sair_por_erro("analises", e),
    };
    match snapshots::gravar_snapshot(&env.layout, &snapshot) {
        Ok((json_path, csv_path)) => {
            println!("conformidade: {:.1}%", snapshot.conformidade.percentual);
            println!("coerência: {}/100", snapshot.score_coerencia);
            if let Some(dias) = snapshot.tramitacao_dias_media {
                println!("tramitação: {dias:.1} dias");
            }
            for alerta in &snapshot.alertas {
                println!("alerta: {}",
                         serde_json::to_string(alerta).unwrap_or_else(|_| "?".to_string()));
            }
            println!("gravado em {} e {}", json_path.display(), csv_path.display());
        }
        Err(e) => {
            eprintln!("[licita analises] falha ao gravar fotografia: {e}");
            exit(5);
        }
    }
}

fn cmd_exportar(env: &mut Ambiente, args: &[String]) {
    let kind = tipo_ou_sai(args);
    let draft = match env.store.get_current(kind) {
        Some(d) => d,
        None => {
            eprintln!("[licita exportar] não há {} corrente", kind.sigla());
            exit(4);
        }
    };
    let markdown = markdown_do_rascunho(&draft);
    match snapshots::gravar_relatorio_markdown(&env.layout, kind, &markdown, Utc::now()) {
        Ok(caminho) => {
            registrar(&mut env.audit, &draft, Etapa::Exportacao);
            println!("relatório gravado em {}", caminho.display());
        }
        Err(e) => {
            eprintln!("[licita exportar] {e}");
            exit(5);
        }
    }
}

fn cmd_prune_auditoria(env: &mut Ambiente) {
    match env.audit.prune(env.config.retencao_dias, Utc::now().date_naive()) {
        Ok(removidos) => println!("partições removidas: {removidos}"),
        Err(e) => sair_por_erro("prune-auditoria", e),
    }
}

#[tokio::main]
async fn main() {
    licita_core::config::init_dotenv();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (comando, resto) = match args.get(1) {
        Some(c) => (c.as_str(), &args[2..]),
        None => uso(),
    };

    let mut env = ambiente();
    match comando {
        "extrair" => cmd_extrair(&mut env, resto).await,
        "refinar" => cmd_refinar(&mut env, resto).await,
        "validar" => cmd_validar(&mut env, resto).await,
        "promover" => cmd_promover(&mut env, resto),
        "status" => cmd_status(&env),
        "coerencia" => cmd_coerencia(&env),
        "analises" => cmd_analises(&env),
        "exportar" => cmd_exportar(&mut env, resto),
        "prune-auditoria" => cmd_prune_auditoria(&mut env),
        _ => uso(),
    }
}
