//! Shared fixtures for building flows in tests.
use kaiwa::prelude::*;

pub const WEBHOOK: &str = "https://hooks.example.com/esi";

/// Three nodes: "welcome" (start) with edges yes -> "qualify" and
/// no -> "callback"; both targets are terminal.
#[allow(dead_code)]
pub fn welcome_builder() -> FlowBuilder {
    let mut builder = FlowBuilder::new();
    builder
        .set_global_prompt("Eres Bea, asesora de ESI.")
        .set_language("es-ES")
        .set_voice("custom_voice_test");
    builder
        .add_node(
            Node::conversation("welcome", "Welcome", "¿Es buen momento para hablar?")
                .start()
                .edge(Edge::prompt("yes", "qualify", "El usuario tiene tiempo").unwrap())
                .edge(Edge::prompt("no", "callback", "El usuario está ocupado").unwrap())
                .build()
                .unwrap(),
        )
        .unwrap();
    builder
        .add_node(
            Node::conversation("qualify", "Qualify", "Tres preguntas rápidas.")
                .build()
                .unwrap(),
        )
        .unwrap();
    builder
        .add_node(
            Node::conversation("callback", "Callback", "¿Cuándo te llamamos?")
                .build()
                .unwrap(),
        )
        .unwrap();
    builder
}

/// A form-encoded booking tool with a nested object parameter.
#[allow(dead_code)]
pub fn booking_tool() -> Tool {
    Tool::builder("tool-book", "book_calendar", WEBHOOK)
        .description("Agendar reunión con especialista")
        .parameter_type(ParameterEncoding::Form)
        .parameters(
            ObjectSchema::new()
                .required_property("customer_name", PropertySchema::string("Nombre del lead"))
                .required_property(
                    "meeting_datetime",
                    PropertySchema::string("Fecha y hora en formato ISO"),
                )
                .property(
                    "meeting_type",
                    PropertySchema::one_of("Tipo de reunión", ["presencial", "videollamada"]),
                )
                .property("copy_bea", PropertySchema::boolean("Si incluir a Bea en copia"))
                .property(
                    "slot",
                    PropertySchema::object(
                        ObjectSchema::new()
                            .required_property("start", PropertySchema::string("Inicio"))
                            .property("minutes", PropertySchema::integer("Duración")),
                    ),
                ),
        )
        .response_variable("booking_id", "$.id")
        .build()
        .unwrap()
}

/// A flow touching every node type: extraction, equation branch with an else
/// edge, a function call, a transfer and an end node.
#[allow(dead_code)]
pub fn booking_builder() -> FlowBuilder {
    let mut builder = FlowBuilder::new();
    builder
        .set_global_prompt("Eres Bea.")
        .set_language("es-ES")
        .set_voice("custom_voice_test")
        .set_start_speaker(Speaker::Agent)
        .set_model_choice(ModelChoice::cascading("gpt-4.1"))
        .add_knowledge_base("kb-courses")
        .set_begin_tag_position(122.0, 333.0);
    builder.add_tool(booking_tool()).unwrap();

    let nodes = [
        Node::conversation("welcome", "Welcome", "Preséntate como Bea.")
            .start()
            .start_speaker(Speaker::Agent)
            .position(342.0, 433.0)
            .edge(Edge::prompt("e-interested", "extract", "Muestra interés").unwrap())
            .edge(Edge::prompt("e-busy", "end", "No tiene tiempo").unwrap())
            .build(),
        Node::builder("extract", "Extract", NodeType::ExtractDynamicVariables)
            .position(1682.0, 1240.0)
            .variable(Variable::choice("tipo_curso", "Modalidad", ["online", "privado"]).unwrap())
            .variable(Variable::new("motivation", "Objetivo", VariableType::String).unwrap())
            .edge(Edge::prompt("e-extracted", "route", "Variables extraídas").unwrap())
            .build(),
        Node::builder("route", "Route", NodeType::Branch)
            .edge(
                Edge::new(
                    "e-private",
                    "book",
                    TransitionCondition::all_of(vec![Equation::new(
                        "{{tipo_curso}}",
                        ComparisonOperator::Equal,
                        "privado",
                    )]),
                )
                .unwrap(),
            )
            .else_edge(Edge::prompt("e-else", "transfer", "Cualquier otro caso").unwrap())
            .build(),
        Node::function("book", "Book", "book_calendar")
            .speak_during_execution(true)
            .edge(Edge::prompt("e-booked", "end", "Reserva completada").unwrap())
            .build(),
        Node::builder("transfer", "Transfer", NodeType::TransferCall)
            .transfer_to("+34910000000")
            .build(),
        Node::end("end", "End Call", "¡Gracias y que tengas un excelente día!")
            .position(3000.0, 1500.0)
            .build(),
    ];
    for node in nodes {
        builder.add_node(node.unwrap()).unwrap();
    }
    builder
}
