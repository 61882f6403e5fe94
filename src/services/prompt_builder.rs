//! Grading prompt construction
//!
//! Pure and deterministic: the same (assignment, solution) input always
//! renders byte-identical output. The template is rendered in Spanish, the
//! platform's teaching language, and always states the `Nota: n/10` output
//! contract. The rest of the pipeline parses the grade out of exactly that
//! marker, so it is repeated to the model on every single call.

use crate::models::GradingRequest;

/// Renders the grading prompt for one submission
pub fn build_prompt(request: GradingRequest<'_>) -> String {
    let assignment = request.assignment;

    let mut prompt = format!(
        "Eres un evaluador de actividades, evalúa la siguiente solución y proporciona feedback \
         constructivo, pero muy breve y quiero que también me des la nota de la entrega en formato: \
         Nota: n/10. Es IMPRESCINDIBLE que incluyas exactamente este formato 'Nota: n/10' al final \
         de tu respuesta o el sistema no podrá leer la calificación. No uses Markdown, solo texto \
         plano. La actividad es {} el enunciado es el siguiente: {}. La solución que se proporciona \
         es: {}. Recuerda, sé estricto con la nota, no seas tan generoso si está mal, si hace algo \
         que no se pide, o no se cumple el enunciado indícalo y disminuye la nota, pero si lo hace \
         bien, no disminuyas la nota y ponle un 10, aunque haya algunos aspectos no muy relevantes \
         a mejorar",
        assignment.title, assignment.description, request.solution
    );

    if let Some(language) = &assignment.programming_language {
        prompt.push_str(&format!(
            " La solución es un fragmento de código, debe estar en {}. Cuando me des la \
             corrección, nunca me des el código corregido, solo el feedback. Si el código no \
             compila por errores graves, suspende la nota, si no compila por errores menores, \
             disminuye la nota. (No tengas en cuenta que falten incluir bibliotecas, solo evalúa \
             el código que se proporciona)",
            language
        ));
    }

    if let Some(criteria) = &assignment.evaluation_criteria {
        prompt.push_str(&format!(
            " Los criterios que tendrás en cuenta para evaluar la solución son: {}, si no se \
             cumple el enunciado y los criterios de evaluación indícalo y penaliza la nota",
            criteria
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Assignment;

    fn assignment() -> Assignment {
        Assignment::new(1, "Sumas", "Suma los numeros del 1 al 100", Utc::now())
    }

    #[test]
    fn prompt_is_deterministic() {
        let assignment = assignment();
        let request = GradingRequest {
            assignment: &assignment,
            solution: "5050",
        };
        assert_eq!(build_prompt(request), build_prompt(request));
    }

    #[test]
    fn prompt_always_states_the_grade_marker() {
        let assignment = assignment();
        let request = GradingRequest {
            assignment: &assignment,
            solution: "5050",
        };
        assert!(build_prompt(request).contains("Nota:"));
    }

    #[test]
    fn prompt_embeds_assignment_and_solution() {
        let assignment = assignment();
        let request = GradingRequest {
            assignment: &assignment,
            solution: "la respuesta es 5050",
        };
        let prompt = build_prompt(request);
        assert!(prompt.contains("Sumas"));
        assert!(prompt.contains("Suma los numeros del 1 al 100"));
        assert!(prompt.contains("la respuesta es 5050"));
    }

    #[test]
    fn language_clause_is_conditional() {
        let mut assignment = assignment();
        let solution = "print(5050)";

        let without = build_prompt(GradingRequest {
            assignment: &assignment,
            solution,
        });
        assert!(!without.contains("fragmento de código"));

        assignment.programming_language = Some("Python".to_string());
        let with = build_prompt(GradingRequest {
            assignment: &assignment,
            solution,
        });
        assert!(with.contains("Python"));
        assert!(with.contains("nunca me des el código corregido"));
    }

    #[test]
    fn criteria_clause_is_conditional() {
        let mut assignment = assignment();
        assignment.evaluation_criteria = Some("claridad, eficiencia".to_string());
        let prompt = build_prompt(GradingRequest {
            assignment: &assignment,
            solution: "5050",
        });
        assert!(prompt.contains("claridad, eficiencia"));
    }
}
