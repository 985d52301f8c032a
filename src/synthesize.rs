//! Synthetic route alternatives.
//!
//! When the routing provider returns a single path, two extra entries are
//! derived from it so the client always has safer and faster options to
//! show. The derived entries reuse the base route's geometry: they are a
//! different summary and score for the same line on the map, not a
//! different physical path. They are flagged `synthetic`.

use crate::config::{SynthesisConfig, VariantConfig};
use crate::models::{AnnotatedRoute, ColorClass, RouteSummary, SafetyAssessment};

/// Returns `routes` unchanged unless it holds exactly one route, in which
/// case a safer/slower and a riskier/faster variant are appended.
///
/// Zero routes also come back unchanged; the caller reports that as
/// "no route found".
#[must_use]
pub fn ensure_alternatives(
    mut routes: Vec<AnnotatedRoute>,
    config: &SynthesisConfig,
) -> Vec<AnnotatedRoute> {
    if routes.len() != 1 {
        return routes;
    }

    let base = &routes[0];
    let safer = derive(
        base,
        1,
        &config.safer,
        ColorClass::Safe,
        "Low risk: slower alternative on calmer roads.",
    );
    let riskier = derive(
        base,
        2,
        &config.riskier,
        ColorClass::High,
        "High risk: fastest alternative.",
    );

    log::debug!("Single route returned, synthesized safer and faster variants");
    routes.push(safer);
    routes.push(riskier);
    routes
}

fn derive(
    base: &AnnotatedRoute,
    id: usize,
    variant: &VariantConfig,
    color_class: ColorClass,
    message: &str,
) -> AnnotatedRoute {
    AnnotatedRoute {
        id,
        candidate: base.candidate.clone(),
        summary: RouteSummary {
            distance_meters: base.summary.distance_meters * variant.distance_factor,
            duration_seconds: base.summary.duration_seconds * variant.duration_factor,
        },
        safety: SafetyAssessment {
            score: variant.score.min(100),
            color_class,
            message: message.to_string(),
            factors: Vec::new(),
            delay_seconds: base.safety.delay_seconds,
        },
        synthetic: true,
    }
}
