// src/services/pipeline_sync.rs
//
// Ponte entre os dois vocabulários: fase do pipeline da wishlist <-> status da oportunidade.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    oportunidade::StatusOportunidade,
    wishlist::FasePipeline,
};

pub fn map_pipeline_to_opportunity_status(fase: FasePipeline) -> StatusOportunidade {
    match fase {
        FasePipeline::Aprovado | FasePipeline::Planejado | FasePipeline::Apresentado => {
            StatusOportunidade::EmContato
        }
        FasePipeline::AguardandoFeedback => StatusOportunidade::Negociando,
        FasePipeline::Convertido => StatusOportunidade::Ganho,
        FasePipeline::Rejeitado => StatusOportunidade::Perdido,
    }
}

/// Versão para texto cru (importações, payloads antigos). Fase desconhecida vira `em_contato`.
pub fn map_pipeline_to_opportunity_status_raw(fase: &str) -> StatusOportunidade {
    match FasePipeline::parse(fase) {
        Some(fase) => map_pipeline_to_opportunity_status(fase),
        None => {
            tracing::warn!("Fase de pipeline desconhecida '{}', usando em_contato", fase);
            StatusOportunidade::EmContato
        }
    }
}

// Não é inversa exata: em_contato e negociando caem os dois em aguardando_feedback.
pub fn map_opportunity_to_pipeline(status: StatusOportunidade) -> FasePipeline {
    match status {
        StatusOportunidade::EmContato | StatusOportunidade::Negociando => {
            FasePipeline::AguardandoFeedback
        }
        StatusOportunidade::Ganho => FasePipeline::Convertido,
        StatusOportunidade::Perdido => FasePipeline::Rejeitado,
        StatusOportunidade::SemContato => FasePipeline::Planejado,
    }
}

/// Versão para texto cru. Aceita as grafias legadas; status desconhecido vira `planejado`.
pub fn map_opportunity_to_pipeline_raw(status: &str) -> FasePipeline {
    match StatusOportunidade::normalizar(status) {
        Some(status) => map_opportunity_to_pipeline(status),
        None => {
            tracing::warn!("Status de oportunidade desconhecido '{}', usando planejado", status);
            FasePipeline::Planejado
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AutoCreateCheck {
    pub fase_pipeline: FasePipeline,
    pub oportunidade_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub start_at: Option<DateTime<Utc>>,
    pub create_on_presented: bool,
}

/// Decide se a apresentação deve gerar uma oportunidade agora.
///
/// Só é um guarda de "uma vez só" do lado da aplicação; a garantia contra criação
/// dupla concorrente vem do lock de linha em `WishlistService::update_fase`.
pub fn should_auto_create_opp(check: &AutoCreateCheck) -> bool {
    if check.oportunidade_id.is_some() {
        return false;
    }

    if check.create_on_presented && check.fase_pipeline != FasePipeline::Apresentado {
        return false;
    }

    // Registros anteriores ao corte da feature ficam de fora
    if let Some(start_at) = check.start_at {
        if start_at > check.created_at {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn data(dia: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, dia, 12, 0, 0).unwrap()
    }

    fn check(fase: FasePipeline) -> AutoCreateCheck {
        AutoCreateCheck {
            fase_pipeline: fase,
            oportunidade_id: None,
            created_at: data(10),
            start_at: None,
            create_on_presented: true,
        }
    }

    #[test]
    fn mapeia_fases_para_status() {
        assert_eq!(map_pipeline_to_opportunity_status(FasePipeline::Aprovado), StatusOportunidade::EmContato);
        assert_eq!(map_pipeline_to_opportunity_status(FasePipeline::Planejado), StatusOportunidade::EmContato);
        assert_eq!(map_pipeline_to_opportunity_status(FasePipeline::Apresentado), StatusOportunidade::EmContato);
        assert_eq!(
            map_pipeline_to_opportunity_status(FasePipeline::AguardandoFeedback),
            StatusOportunidade::Negociando
        );
        assert_eq!(map_pipeline_to_opportunity_status(FasePipeline::Convertido), StatusOportunidade::Ganho);
        assert_eq!(map_pipeline_to_opportunity_status(FasePipeline::Rejeitado), StatusOportunidade::Perdido);
    }

    #[test]
    fn texto_desconhecido_usa_os_defaults() {
        for lixo in ["", "qualquer", "APRESENTADO!", "fechado"] {
            assert_eq!(map_pipeline_to_opportunity_status_raw(lixo), StatusOportunidade::EmContato);
        }
        for lixo in ["", "qualquer", "aguardando_feedback"] {
            assert_eq!(map_opportunity_to_pipeline_raw(lixo), FasePipeline::Planejado);
        }
    }

    #[test]
    fn texto_conhecido_segue_o_mapa_tipado() {
        for fase in FasePipeline::TODAS {
            assert_eq!(
                map_pipeline_to_opportunity_status_raw(fase.as_str()),
                map_pipeline_to_opportunity_status(fase)
            );
        }
        assert_eq!(map_opportunity_to_pipeline_raw("Apresentado"), FasePipeline::AguardandoFeedback);
        assert_eq!(map_opportunity_to_pipeline_raw("ganho"), FasePipeline::Convertido);
        assert_eq!(map_opportunity_to_pipeline_raw("Sem contato"), FasePipeline::Planejado);
    }

    #[test]
    fn mapa_reverso_e_com_perda() {
        assert_eq!(
            map_opportunity_to_pipeline(StatusOportunidade::EmContato),
            map_opportunity_to_pipeline(StatusOportunidade::Negociando)
        );
        // ida e volta preserva os desfechos
        for fase in [FasePipeline::Convertido, FasePipeline::Rejeitado] {
            assert_eq!(map_opportunity_to_pipeline(map_pipeline_to_opportunity_status(fase)), fase);
        }
    }

    #[test]
    fn ja_vinculada_nunca_cria() {
        for fase in FasePipeline::TODAS {
            for create_on_presented in [true, false] {
                let mut c = check(fase);
                c.create_on_presented = create_on_presented;
                c.oportunidade_id = Some(Uuid::new_v4());
                assert!(!should_auto_create_opp(&c));
            }
        }
    }

    #[test]
    fn com_gate_so_cria_em_apresentado() {
        for fase in FasePipeline::TODAS {
            let esperado = fase == FasePipeline::Apresentado;
            assert_eq!(should_auto_create_opp(&check(fase)), esperado, "fase {}", fase);
        }
    }

    #[test]
    fn sem_gate_cria_em_qualquer_fase() {
        for fase in FasePipeline::TODAS {
            let mut c = check(fase);
            c.create_on_presented = false;
            assert!(should_auto_create_opp(&c));
        }
    }

    #[test]
    fn respeita_data_de_corte() {
        let mut c = check(FasePipeline::Apresentado);
        c.start_at = Some(data(11));
        assert!(!should_auto_create_opp(&c));

        c.start_at = Some(data(10));
        assert!(should_auto_create_opp(&c));

        c.start_at = Some(data(1));
        assert!(should_auto_create_opp(&c));
    }
}
