//! Esquemas estáticos por tipo de artefato.
//!
//! Cada esquema declara os campos administrativos simples e a lista
//! ordenada de seções textuais. A ordem das seções é contrato de
//! apresentação e de concatenação da narrativa; alterações aqui são
//! mudanças de esquema e devem acompanhar a versão do código.

use crate::kind::ArtifactKind;

/// Esquema imutável de um tipo de artefato.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSchema {
    pub artefato: ArtifactKind,
    /// Campos administrativos simples (texto livre curto).
    pub campos: &'static [&'static str],
    /// Seções textuais na ordem fixa de apresentação.
    pub secoes: &'static [&'static str],
}

const CAMPOS_PADRAO: &[&str] = &["unidade", "responsavel", "prazo", "valor_estimado"];

const CAMPOS_CONTRATO: &[&str] = &["contratante", "contratada", "objeto", "valor", "prazo"];

static DFD: ArtifactSchema = ArtifactSchema { artefato: ArtifactKind::Dfd,
                                              campos: CAMPOS_PADRAO,
                                              secoes: &["Contexto Institucional",
                                                        "Diagnóstico da Situação Atual",
                                                        "Justificativa da Necessidade",
                                                        "Objetivos da Contratação",
                                                        "Escopo Inicial",
                                                        "Resultados Esperados",
                                                        "Benefícios Institucionais",
                                                        "Justificativa Legal",
                                                        "Riscos da Não Contratação",
                                                        "Requisitos Mínimos",
                                                        "Critérios de Sucesso"] };

static ETP: ArtifactSchema = ArtifactSchema { artefato: ArtifactKind::Etp,
                                              campos: CAMPOS_PADRAO,
                                              secoes: &["Descrição da Necessidade",
                                                        "Motivação",
                                                        "Levantamento de Mercado",
                                                        "Estimativa de Custos",
                                                        "Soluções Avaliadas",
                                                        "Justificativa do Parcelamento",
                                                        "Resultado da Análise",
                                                        "Resultados Pretendidos"] };

static TR: ArtifactSchema = ArtifactSchema { artefato: ArtifactKind::Tr,
                                             campos: CAMPOS_PADRAO,
                                             secoes: &["Objeto",
                                                       "Justificativa Técnica",
                                                       "Especificação Técnica",
                                                       "Critérios de Julgamento",
                                                       "Riscos",
                                                       "Observações Finais",
                                                       "Prazo de Execução",
                                                       "Estimativa de Valor",
                                                       "Fonte de Recursos"] };

static EDITAL: ArtifactSchema = ArtifactSchema { artefato: ArtifactKind::Edital,
                                                 campos: CAMPOS_PADRAO,
                                                 secoes: &["Objeto",
                                                           "Modalidade e Critério de Julgamento",
                                                           "Condições de Participação",
                                                           "Requisitos de Habilitação",
                                                           "Obrigações da Contratada",
                                                           "Obrigações do Contratante",
                                                           "Prazo de Execução",
                                                           "Fontes de Recursos",
                                                           "Gestor e Fiscal",
                                                           "Sanções Administrativas",
                                                           "Impugnações e Recursos",
                                                           "Observações Gerais"] };

static CONTRATO: ArtifactSchema = ArtifactSchema { artefato: ArtifactKind::Contrato,
                                                   campos: CAMPOS_CONTRATO,
                                                   secoes: &["Cláusula do Objeto",
                                                             "Cláusula de Vigência",
                                                             "Cláusula do Valor e do Pagamento",
                                                             "Cláusula das Obrigações da Contratada",
                                                             "Cláusula das Obrigações do Contratante",
                                                             "Cláusula de Fiscalização",
                                                             "Cláusula de Sanções",
                                                             "Cláusula de Rescisão",
                                                             "Cláusula do Foro"] };

/// Devolve o esquema do tipo pedido.
pub fn schema_de(kind: ArtifactKind) -> &'static ArtifactSchema {
    match kind {
        ArtifactKind::Dfd => &DFD,
        ArtifactKind::Etp => &ETP,
        ArtifactKind::Tr => &TR,
        ArtifactKind::Edital => &EDITAL,
        ArtifactKind::Contrato => &CONTRATO,
    }
}
