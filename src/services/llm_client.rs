// src/services/llm_client.rs
//
// Ranking de parceiros por um modelo de chat compatível com a API da OpenAI.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::LlmConfig,
    models::{oportunidade::OportunidadeDetalhada, sugestao::CandidatoParceiro},
};

/// Ordena candidatos do mais ao menos indicado. Ids desconhecidos são descartados.
#[async_trait]
pub trait RankingProvider: Send + Sync {
    async fn ranquear(
        &self,
        oportunidade: &OportunidadeDetalhada,
        candidatos: &[CandidatoParceiro],
    ) -> Result<Vec<Uuid>, AppError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiRanking {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

const INSTRUCOES: &str = "Você ajuda a escolher parceiros de negócio. \
Responda apenas com um array JSON com os ids dos parceiros, do mais ao menos indicado.";

impl OpenAiRanking {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Falha ao criar o cliente HTTP do LLM")?;
        Ok(Self { client, config })
    }

    fn prompt(oportunidade: &OportunidadeDetalhada, candidatos: &[CandidatoParceiro]) -> String {
        let mut texto = format!(
            "Oportunidade: {} indicou {}.",
            oportunidade.origem_nome, oportunidade.destino_nome
        );
        if let Some(valor) = oportunidade.oportunidade.valor {
            texto.push_str(&format!(" Valor estimado: {}.", valor));
        }
        if let Some(obs) = &oportunidade.oportunidade.observacoes {
            texto.push_str(&format!(" Observações: {}.", obs));
        }
        texto.push_str("\nParceiros candidatos:\n");
        for c in candidatos {
            texto.push_str(&format!(
                "- id={} nome={} indicacoes={} ganhas={} descricao={}\n",
                c.empresa_id,
                c.nome,
                c.indicacoes,
                c.ganhas,
                c.descricao.as_deref().unwrap_or("-")
            ));
        }
        texto
    }
}

#[async_trait]
impl RankingProvider for OpenAiRanking {
    async fn ranquear(
        &self,
        oportunidade: &OportunidadeDetalhada,
        candidatos: &[CandidatoParceiro],
    ) -> Result<Vec<Uuid>, AppError> {
        if candidatos.is_empty() {
            return Ok(Vec::new());
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: INSTRUCOES.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::prompt(oportunidade, candidatos),
                },
            ],
            temperature: 0.0,
        };

        let resposta = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("LLM inacessível: {}", e)))?;

        if !resposta.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "LLM respondeu {}",
                resposta.status()
            )));
        }

        let chat: ChatResponse = resposta
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("resposta do LLM ilegível: {}", e)))?;
        let conteudo = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::ExternalService("LLM respondeu sem escolhas".into()))?;

        extrair_ids(&conteudo, candidatos)
    }
}

/// Lê o array JSON de ids do texto do modelo (aceita cercas de código e texto em volta).
fn extrair_ids(conteudo: &str, candidatos: &[CandidatoParceiro]) -> Result<Vec<Uuid>, AppError> {
    let inicio = conteudo.find('[');
    let fim = conteudo.rfind(']');
    let trecho = match (inicio, fim) {
        (Some(i), Some(f)) if i < f => &conteudo[i..=f],
        _ => return Err(AppError::ExternalService("LLM não retornou um array JSON".into())),
    };

    let brutos: Vec<String> = serde_json::from_str(trecho)
        .map_err(|e| AppError::ExternalService(format!("array do LLM inválido: {}", e)))?;

    let mut ids = Vec::new();
    for bruto in brutos {
        let Ok(id) = bruto.trim().parse::<Uuid>() else {
            continue;
        };
        if candidatos.iter().any(|c| c.empresa_id == id) && !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        empresa::TipoEmpresa,
        oportunidade::{Oportunidade, StatusOportunidade},
    };
    use chrono::{NaiveDate, Utc};
    use mockito::Server;

    fn candidato(nome: &str) -> CandidatoParceiro {
        CandidatoParceiro {
            empresa_id: Uuid::new_v4(),
            nome: nome.to_string(),
            descricao: None,
            indicacoes: 3,
            ganhas: 1,
            valor_medio: None,
        }
    }

    fn oportunidade() -> OportunidadeDetalhada {
        OportunidadeDetalhada {
            oportunidade: Oportunidade {
                id: Uuid::new_v4(),
                empresa_origem_id: Uuid::new_v4(),
                empresa_destino_id: Uuid::new_v4(),
                status: StatusOportunidade::EmContato,
                valor: None,
                data_indicacao: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                data_fechamento: None,
                observacoes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            origem_nome: "Parceiro A".into(),
            origem_tipo: TipoEmpresa::Parceiro,
            destino_nome: "Grupo B".into(),
            destino_tipo: TipoEmpresa::Intragrupo,
        }
    }

    fn ranking(url: String) -> OpenAiRanking {
        OpenAiRanking::new(LlmConfig {
            api_key: "sk-test".into(),
            base_url: url,
            model: "gpt-4o-mini".into(),
        })
        .unwrap()
    }

    fn resposta_chat(conteudo: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": conteudo } }]
        })
        .to_string()
    }

    #[test]
    fn extrai_ids_de_texto_com_cerca() {
        let a = candidato("A");
        let b = candidato("B");
        let texto = format!("```json\n[\"{}\", \"{}\", \"lixo\", \"{}\"]\n```", b.empresa_id, a.empresa_id, b.empresa_id);

        let ids = extrair_ids(&texto, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(ids, vec![b.empresa_id, a.empresa_id]);
    }

    #[test]
    fn ignora_ids_fora_da_lista() {
        let a = candidato("A");
        let texto = format!("[\"{}\", \"{}\"]", Uuid::new_v4(), a.empresa_id);
        assert_eq!(extrair_ids(&texto, &[a.clone()]).unwrap(), vec![a.empresa_id]);
    }

    #[test]
    fn sem_array_e_erro() {
        assert!(extrair_ids("não sei", &[candidato("A")]).is_err());
    }

    #[tokio::test]
    async fn chama_chat_completions_e_le_o_ranking() {
        let mut server = Server::new_async().await;
        let a = candidato("A");
        let b = candidato("B");

        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(resposta_chat(&format!("[\"{}\", \"{}\"]", b.empresa_id, a.empresa_id)))
            .create_async()
            .await;

        let ids = ranking(server.url())
            .ranquear(&oportunidade(), &[a.clone(), b.clone()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ids, vec![b.empresa_id, a.empresa_id]);
    }

    #[tokio::test]
    async fn erro_http_vira_falha_externa() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("{\"error\":\"boom\"}")
            .create_async()
            .await;

        let err = ranking(server.url())
            .ranquear(&oportunidade(), &[candidato("A")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
