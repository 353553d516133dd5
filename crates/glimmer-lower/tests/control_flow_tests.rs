mod common;

use common::*;
use glimmer_ast::{AssignOp, BinaryOp, Expr, SourceType, Stmt};
use glimmer_core::{verify_module, ControlFlowGraph, Terminator, Value};
use glimmer_lower::{ImplicitReturn, LogicalOps, LowerError, LoweringConfig};
use pretty_assertions::assert_eq;

fn block_of(stmts: Vec<Stmt>) -> Stmt {
    Stmt::block(vec![], stmts)
}

#[test]
fn test_if_else_with_returns_keeps_unreachable_merge() {
    let module = lower(vec![function(
        "pick",
        SourceType::Int,
        vec![],
        vec![],
        vec![Stmt::if_else(
            Expr::bool(true),
            block_of(vec![Stmt::ret(Some(Expr::int(1)))]),
            block_of(vec![Stmt::ret(Some(Expr::int(2)))]),
        )],
    )])
    .unwrap();
    let body = body(&module, "pick");

    assert_eq!(labels(body), vec!["entry", "then.1", "else.2", "merge.3"]);
    assert_eq!(entry(body).opcodes(), vec!["br"]);
    assert_eq!(block(body, "then.1").terminator, Terminator::Return(Some(Value::int(1))));
    assert_eq!(block(body, "else.2").terminator, Terminator::Return(Some(Value::int(2))));

    let cfg = ControlFlowGraph::from_body(body);
    assert_eq!(cfg.unreachable_blocks(), vec![block(body, "merge.3").id]);
}

#[test]
fn test_if_without_else_branches_to_merge() {
    let module = lower(vec![function(
        "clamp",
        SourceType::Void,
        vec![var("x", SourceType::Int)],
        vec![],
        vec![Stmt::if_then(
            Expr::binary(BinaryOp::Gt, Expr::var("x"), Expr::int(9)),
            Stmt::expr(Expr::assign(Expr::var("x"), Expr::int(9))),
        )],
    )])
    .unwrap();
    let body = body(&module, "clamp");

    assert_eq!(labels(body), vec!["entry", "then.1", "merge.2"]);
    assert_eq!(successor_labels(body, "entry"), vec!["then.1", "merge.2"]);
    assert_eq!(successor_labels(body, "then.1"), vec!["merge.2"]);
    assert_eq!(block(body, "merge.2").terminator, Terminator::Return(None));
}

#[test]
fn test_for_loop_with_break() {
    // for (i = 0; i < 10; i = i + 1) { if (i == 5) break; }
    let i = || Expr::var("i");
    let module = lower(vec![function(
        "count",
        SourceType::Void,
        vec![],
        vec![var("i", SourceType::Int)],
        vec![Stmt::for_loop(
            Some(Expr::assign(i(), Expr::int(0))),
            Some(Expr::binary(BinaryOp::Lt, i(), Expr::int(10))),
            Some(Expr::assign(i(), Expr::binary(BinaryOp::Add, i(), Expr::int(1)))),
            block_of(vec![Stmt::if_then(
                Expr::binary(BinaryOp::Eq, i(), Expr::int(5)),
                Stmt::break_(),
            )]),
        )],
    )])
    .unwrap();
    let body = body(&module, "count");

    assert_eq!(
        labels(body),
        vec![
            "entry",
            "for.header.1",
            "for.body.2",
            "for.step.3",
            "for.end.4",
            "then.5",
            "merge.6",
        ]
    );
    assert_eq!(entry(body).opcodes(), vec!["alloca", "store", "jump"]);
    assert_eq!(successor_labels(body, "entry"), vec!["for.header.1"]);
    assert_eq!(successor_labels(body, "for.header.1"), vec!["for.body.2", "for.end.4"]);
    assert_eq!(block(body, "for.body.2").opcodes(), vec!["load", "icmp", "br"]);
    assert_eq!(successor_labels(body, "for.body.2"), vec!["then.5", "merge.6"]);
    assert_eq!(successor_labels(body, "then.5"), vec!["for.end.4"]);
    assert_eq!(successor_labels(body, "merge.6"), vec!["for.step.3"]);
    assert_eq!(
        block(body, "for.step.3").opcodes(),
        vec!["load", "add", "store", "jump"]
    );
    assert_eq!(successor_labels(body, "for.step.3"), vec!["for.header.1"]);
    assert_eq!(block(body, "for.end.4").terminator, Terminator::Return(None));

    let header = &block(body, "for.header.1").metadata;
    assert!(header.is_loop_header);
    assert_eq!(header.loop_depth, 1);
    assert!(block(body, "for.end.4").metadata.is_loop_exit);
    assert_eq!(block(body, "then.5").metadata.loop_depth, 1);
    assert_eq!(block(body, "for.end.4").metadata.loop_depth, 0);
}

#[test]
fn test_short_circuit_loop_test_stays_inside_loop() {
    // while (a && b) {}
    let config = LoweringConfig {
        logical_ops: LogicalOps::ShortCircuit,
        ..LoweringConfig::default()
    };
    let module = lower_with(
        vec![function(
            "spin",
            SourceType::Void,
            vec![var("a", SourceType::Bool), var("b", SourceType::Bool)],
            vec![],
            vec![Stmt::while_loop(
                Expr::binary(BinaryOp::And, Expr::var("a"), Expr::var("b")),
                block_of(vec![]),
            )],
        )],
        config,
    )
    .unwrap();
    let body = body(&module, "spin");

    assert_eq!(
        labels(body),
        vec![
            "entry",
            "while.header.1",
            "while.body.2",
            "while.end.3",
            "logic.rhs.4",
            "logic.end.5",
        ]
    );
    assert_eq!(
        successor_labels(body, "logic.end.5"),
        vec!["while.body.2", "while.end.3"]
    );
    for label in ["logic.rhs.4", "logic.end.5"] {
        let metadata = &block(body, label).metadata;
        assert_eq!(metadata.loop_depth, 1, "{}", label);
        assert!(!metadata.is_loop_header, "{}", label);
    }
    assert_eq!(block(body, "while.end.3").metadata.loop_depth, 0);
}

#[test]
fn test_for_without_step_continues_at_header() {
    let module = lower(vec![function(
        "spin",
        SourceType::Void,
        vec![],
        vec![],
        vec![Stmt::for_loop(None, None, None, block_of(vec![Stmt::continue_()]))],
    )])
    .unwrap();
    let body = body(&module, "spin");

    assert_eq!(labels(body), vec!["entry", "for.header.1", "for.body.2", "for.end.3"]);
    assert_eq!(block(body, "for.header.1").opcodes(), vec!["jump"]);
    assert_eq!(successor_labels(body, "for.body.2"), vec!["for.header.1"]);
    assert!(ControlFlowGraph::from_body(body)
        .unreachable_blocks()
        .contains(&block(body, "for.end.3").id));
}

#[test]
fn test_while_loop_shape() {
    let n = || Expr::var("n");
    let module = lower(vec![function(
        "drain",
        SourceType::Void,
        vec![var("n", SourceType::Int)],
        vec![],
        vec![Stmt::while_loop(
            Expr::binary(BinaryOp::Gt, n(), Expr::int(0)),
            Stmt::expr(Expr::compound_assign(AssignOp::Sub, n(), Expr::int(1))),
        )],
    )])
    .unwrap();
    let body = body(&module, "drain");

    assert_eq!(
        labels(body),
        vec!["entry", "while.header.1", "while.body.2", "while.end.3"]
    );
    assert_eq!(
        successor_labels(body, "while.header.1"),
        vec!["while.body.2", "while.end.3"]
    );
    assert_eq!(successor_labels(body, "while.body.2"), vec!["while.header.1"]);
}

#[test]
fn test_break_and_continue_target_innermost_loop() {
    // while (true) { while (true) { continue; } break; }
    let module = lower(vec![function(
        "nested",
        SourceType::Void,
        vec![],
        vec![],
        vec![Stmt::while_loop(
            Expr::bool(true),
            block_of(vec![
                Stmt::while_loop(Expr::bool(true), block_of(vec![Stmt::continue_()])),
                Stmt::break_(),
            ]),
        )],
    )])
    .unwrap();
    let body = body(&module, "nested");

    assert_eq!(
        labels(body),
        vec![
            "entry",
            "while.header.1",
            "while.body.2",
            "while.end.3",
            "while.header.4",
            "while.body.5",
            "while.end.6",
        ]
    );
    assert_eq!(successor_labels(body, "while.body.5"), vec!["while.header.4"]);
    assert_eq!(successor_labels(body, "while.end.6"), vec!["while.end.3"]);
    assert_eq!(block(body, "while.body.5").metadata.loop_depth, 2);
}

#[test]
fn test_nested_for_break_leaves_only_inner_loop() {
    let module = lower(vec![function(
        "nested",
        SourceType::Void,
        vec![],
        vec![],
        vec![Stmt::for_loop(
            None,
            None,
            None,
            block_of(vec![
                Stmt::for_loop(None, None, None, block_of(vec![Stmt::break_()])),
                Stmt::continue_(),
            ]),
        )],
    )])
    .unwrap();
    let body = body(&module, "nested");

    assert_eq!(successor_labels(body, "for.body.5"), vec!["for.end.6"]);
    assert_eq!(successor_labels(body, "for.end.6"), vec!["for.header.1"]);
}

#[test]
fn test_statements_after_return_are_dropped() {
    let module = lower(vec![function(
        "early",
        SourceType::Void,
        vec![],
        vec![],
        vec![
            Stmt::ret(None),
            Stmt::expr(Expr::assign(Expr::var("missing"), Expr::int(1))),
        ],
    )])
    .unwrap();

    assert_eq!(entry(body(&module, "early")).opcodes(), vec!["return"]);
}

#[test]
fn test_every_block_is_terminated() {
    let x = || Expr::var("x");
    let module = lower(vec![function(
        "busy",
        SourceType::Float,
        vec![var("x", SourceType::Float)],
        vec![],
        vec![
            Stmt::while_loop(
                Expr::binary(BinaryOp::Lt, x(), Expr::float(4.0)),
                block_of(vec![
                    Stmt::if_else(
                        Expr::binary(BinaryOp::Gt, x(), Expr::float(2.0)),
                        Stmt::break_(),
                        Stmt::expr(Expr::compound_assign(AssignOp::Mul, x(), Expr::float(2.0))),
                    ),
                    Stmt::continue_(),
                ]),
            ),
            Stmt::ret(Some(x())),
        ],
    )])
    .unwrap();

    let body = body(&module, "busy");
    for block in body.blocks.values() {
        assert!(block.is_terminated(), "{} is not terminated", block.label);
    }
    verify_module(&module).unwrap();
}

#[test]
fn test_allocas_only_lead_the_entry_block() {
    let config = LoweringConfig {
        logical_ops: LogicalOps::ShortCircuit,
        ..LoweringConfig::default()
    };
    let k = || Expr::var("k");
    let module = lower_with(
        vec![function(
            "scan",
            SourceType::Void,
            vec![var("limit", SourceType::Int)],
            vec![var("k", SourceType::Int)],
            vec![Stmt::for_loop(
                Some(Expr::assign(k(), Expr::int(0))),
                Some(Expr::binary(
                    BinaryOp::And,
                    Expr::binary(BinaryOp::Lt, k(), Expr::var("limit")),
                    Expr::bool(true),
                )),
                Some(Expr::postfix(glimmer_ast::PostfixOp::Increment, k())),
                Stmt::block(
                    vec![var("inner", SourceType::Vec2)],
                    vec![Stmt::expr(Expr::assign(
                        Expr::field(Expr::var("inner"), "y"),
                        Expr::float(1.0),
                    ))],
                ),
            )],
        )],
        config,
    )
    .unwrap();

    let body = body(&module, "scan");
    let entry = entry(body);
    let allocas = entry.instructions.iter().take_while(|i| i.is_alloca()).count();
    assert_eq!(allocas, 4);
    assert!(entry.instructions[allocas..].iter().all(|i| !i.is_alloca()));
    for block in body.blocks.values().filter(|b| b.id != body.entry_block) {
        assert!(block.instructions.iter().all(|i| !i.is_alloca()), "{}", block.label);
    }
}

fn both(op: BinaryOp) -> glimmer_ast::Decl {
    function(
        "both",
        SourceType::Bool,
        vec![var("a", SourceType::Bool), var("b", SourceType::Bool)],
        vec![],
        vec![Stmt::ret(Some(Expr::binary(op, Expr::var("a"), Expr::var("b"))))],
    )
}

#[test]
fn test_logical_operators_are_eager_by_default() {
    let module = lower(vec![both(BinaryOp::And)]).unwrap();
    let body = body(&module, "both");

    assert_eq!(labels(body), vec!["entry"]);
    assert_eq!(
        entry(body).opcodes(),
        vec!["alloca", "alloca", "store", "store", "load", "load", "and", "return"]
    );
}

#[test]
fn test_short_circuit_and_or() {
    let config = LoweringConfig {
        logical_ops: LogicalOps::ShortCircuit,
        ..LoweringConfig::default()
    };

    let module = lower_with(vec![both(BinaryOp::And)], config.clone()).unwrap();
    let body_and = body(&module, "both");
    assert_eq!(labels(body_and), vec!["entry", "logic.rhs.1", "logic.end.2"]);
    assert_eq!(
        entry(body_and).opcodes(),
        vec!["alloca", "alloca", "alloca", "store", "store", "load", "store", "br"]
    );
    assert_eq!(successor_labels(body_and, "entry"), vec!["logic.rhs.1", "logic.end.2"]);
    assert_eq!(
        block(body_and, "logic.rhs.1").opcodes(),
        vec!["load", "store", "jump"]
    );
    assert_eq!(block(body_and, "logic.end.2").opcodes(), vec!["load", "return"]);

    let module = lower_with(vec![both(BinaryOp::Or)], config).unwrap();
    let body_or = body(&module, "both");
    assert_eq!(successor_labels(body_or, "entry"), vec!["logic.end.2", "logic.rhs.1"]);
}

#[test]
fn test_implicit_return_policies() {
    // int f(bool c) { if (c) return 1; }
    let partial = || {
        function(
            "partial",
            SourceType::Int,
            vec![var("c", SourceType::Bool)],
            vec![],
            vec![Stmt::if_then(Expr::var("c"), Stmt::ret(Some(Expr::int(1))))],
        )
    };

    let module = lower(vec![partial()]).unwrap();
    assert_eq!(
        block(body(&module, "partial"), "merge.2").terminator,
        Terminator::Return(Some(Value::int(0)))
    );

    let reject = LoweringConfig {
        implicit_return: ImplicitReturn::Reject,
        ..LoweringConfig::default()
    };
    let err = lower_with(vec![partial()], reject.clone()).unwrap_err();
    assert!(matches!(err, LowerError::MissingReturn { ref function, .. } if function == "partial"));

    let complete = function(
        "complete",
        SourceType::Int,
        vec![],
        vec![],
        vec![Stmt::if_else(
            Expr::bool(true),
            Stmt::ret(Some(Expr::int(1))),
            Stmt::ret(Some(Expr::int(2))),
        )],
    );
    assert!(lower_with(vec![complete], reject).is_ok());
}

#[test]
fn test_stray_break_is_reported_with_later_errors() {
    let err = lower(vec![
        function("loose", SourceType::Void, vec![], vec![], vec![Stmt::break_()]),
        function(
            "twice",
            SourceType::Void,
            vec![],
            vec![var("a", SourceType::Int), var("a", SourceType::Int)],
            vec![],
        ),
    ])
    .unwrap_err();

    let errors = err.errors();
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        errors[0],
        LowerError::ControlFlowMisuse { statement: "break", .. }
    ));
    assert!(matches!(errors[1], LowerError::ScopeConflict { name, .. } if name == "a"));
    assert!(!err.is_fatal());
}

#[test]
fn test_switch_is_unsupported() {
    let err = lower(vec![function(
        "route",
        SourceType::Void,
        vec![var("k", SourceType::Int)],
        vec![],
        vec![Stmt::new(glimmer_ast::StmtKind::Switch {
            expr: Expr::var("k"),
            cases: vec![],
            default: None,
        })],
    )])
    .unwrap_err();

    assert!(matches!(err, LowerError::Unsupported { ref construct, .. } if construct == "switch statement"));
    assert!(err.is_fatal());
}
