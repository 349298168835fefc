//! Test fixtures and factory functions for creating test data.

use std::collections::BTreeMap;

use assessment_core::NewQuestion;
use serde_json::json;

/// Build a four-option question whose correct answer is `A`.
pub fn new_question(track: &str, topic: &str, stem: &str) -> NewQuestion {
    let options: BTreeMap<String, String> = [
        ("A", "Opcion correcta"),
        ("B", "Primer distractor"),
        ("C", "Segundo distractor"),
        ("D", "Tercer distractor"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    NewQuestion {
        track: track.to_string(),
        competency: "Gestion Tributaria".to_string(),
        topic: topic.to_string(),
        difficulty: Some(3),
        stem: stem.to_string(),
        options,
        correct_key: "A".to_string(),
        rationale: "Segun el Estatuto Tributario".to_string(),
    }
}

/// Request body for POST /api/questions.
pub fn question_body(track: &str, topic: &str, stem: &str) -> serde_json::Value {
    json!({
        "track": track,
        "competency": "Gestion Tributaria",
        "topic": topic,
        "difficulty": 2,
        "stem": stem,
        "options": { "A": "Uno", "B": "Dos", "C": "Tres" },
        "correct_key": "a",
        "rationale": "Explicacion"
    })
}

/// Ten questions across all tracks: five functional, two behavioral,
/// three integrity, over seven distinct topics.
pub fn sample_bank() -> Vec<NewQuestion> {
    vec![
        new_question("FUNCTIONAL", "IVA", "Cual es la tarifa general del impuesto sobre las ventas"),
        new_question("FUNCTIONAL", "IVA", "Que bienes se encuentran excluidos del IVA"),
        new_question("FUNCTIONAL", "Renta", "Quienes son contribuyentes del impuesto de renta"),
        new_question("FUNCTIONAL", "Renta", "Como se determina la renta liquida gravable"),
        new_question(
            "FUNCTIONAL",
            "Procedimiento",
            "Cual es el termino para interponer el recurso de reconsideracion",
        ),
        new_question("BEHAVIORAL", "Equipo", "Como actuaria ante un conflicto con un companero de trabajo"),
        new_question("BEHAVIORAL", "Servicio", "Un ciudadano presenta una queja airada en ventanilla"),
        new_question("INTEGRITY", "Etica", "Un contribuyente le ofrece un obsequio para agilizar un tramite"),
        new_question("INTEGRITY", "Etica", "Detecta que un superior manipula un expediente"),
        new_question("INTEGRITY", "Transparencia", "Debe declarar un conflicto de intereses en una fiscalizacion"),
    ]
}
