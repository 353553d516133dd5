use glimmer_core::{
    Constant, FloatCC, FunctionBuilder, FunctionSignature, Module, ModuleBuilder, Parameter,
    TargetInfo, Type, Value,
};
use glimmer_emit::{Emitter, EmitterConfig, IndentStyle, TextEmitter, VerbosityLevel};
use pretty_assertions::assert_eq;

/// `float clampScale(float x)` with a loop-free branch plus one prototype.
fn sample_module() -> Module {
    let mut module = ModuleBuilder::new("sample", TargetInfo::default());
    let scale = module
        .add_global("scale", Type::Float, Constant::float(2.0), true)
        .unwrap();

    let signature = FunctionSignature::new(
        "clampScale",
        vec![Parameter::new("x", Type::Float)],
        Type::Float,
    );
    let mut func = FunctionBuilder::new(signature.clone());
    let entry = func.entry_block();
    func.switch_to_block(entry).unwrap();

    let slot = func.alloca(Some("x"), Type::Float).unwrap();
    let param = func.param(0).unwrap();
    func.ins().unwrap().store(slot.clone(), param).unwrap();
    let x = func.ins().unwrap().load(slot.clone(), Type::Float).unwrap();
    let factor = func.ins().unwrap().load(scale, Type::Float).unwrap();
    let scaled = func
        .ins()
        .unwrap()
        .fmul(x, factor, Type::Float)
        .unwrap();
    func.ins().unwrap().store(slot.clone(), scaled.clone()).unwrap();
    let too_big = func
        .ins()
        .unwrap()
        .fcmp(FloatCC::GreaterThan, scaled, Value::float(1.0), Type::Float)
        .unwrap();

    let then_block = func.create_block("then");
    let merge = func.create_block("merge");
    func.ins().unwrap().branch(too_big, then_block, merge).unwrap();

    func.switch_to_block(then_block).unwrap();
    func.ins().unwrap().store(slot.clone(), Value::float(1.0)).unwrap();
    func.ins().unwrap().jump(merge).unwrap();

    func.switch_to_block(merge).unwrap();
    let result = func.ins().unwrap().load(slot, Type::Float).unwrap();
    func.ins().unwrap().return_value(result).unwrap();

    module.define_function(func.finish().unwrap()).unwrap();
    module
        .declare_function(FunctionSignature::new(
            "noise",
            vec![Parameter::new("p", Type::vec(2))],
            Type::Float,
        ))
        .unwrap();
    module.build(true).unwrap()
}

fn plain(verbosity: VerbosityLevel) -> TextEmitter {
    TextEmitter::new(EmitterConfig {
        verbosity,
        ..EmitterConfig::plain()
    })
}

#[test]
fn test_header_and_globals() {
    let text = plain(VerbosityLevel::Normal)
        .emit_to_string(&sample_module())
        .unwrap();

    assert!(text.starts_with("; module sample\n; target x86_64-unknown-linux-gnu\n"));
    assert!(text.contains("constant @g0 scale: f32 = 2.0\n"));
}

#[test]
fn test_quiet_skips_header() {
    let text = plain(VerbosityLevel::Quiet)
        .emit_to_string(&sample_module())
        .unwrap();

    assert!(text.starts_with("constant @g0 scale"));
    assert!(!text.contains("; module"));
}

#[test]
fn test_function_layout() {
    let text = plain(VerbosityLevel::Normal)
        .emit_to_string(&sample_module())
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();

    let start = lines
        .iter()
        .position(|l| l.starts_with("define f32 @clampScale(f32 %p0) {"))
        .expect("definition header");
    assert_eq!(
        &lines[start + 1..start + 10],
        &[
            "entry:",
            "    %slot0 = alloca f32  ; x",
            "    store %p0, %slot0",
            "    %t0 = load f32, %slot0",
            "    %t1 = load f32, @g0",
            "    %t2 = fmul f32 %t0, %t1",
            "    store %t2, %slot0",
            "    %t3 = fcmp gt f32 %t2, 1.0",
            "    br %t3, then.1, merge.2",
        ]
    );
    assert!(text.contains("\nthen.1:\n    store 1.0, %slot0\n    jump merge.2\n"));
    assert!(text.contains("    return %t4\n}\n"));
}

#[test]
fn test_prototype_is_declared() {
    let text = plain(VerbosityLevel::Normal)
        .emit_to_string(&sample_module())
        .unwrap();

    assert!(text.contains("declare f32 @noise(<2 x f32> %p0)\n"));
    assert!(!text.contains("@noise(<2 x f32> %p0) {"));
}

#[test]
fn test_verbose_prints_predecessors() {
    let text = plain(VerbosityLevel::Verbose)
        .emit_to_string(&sample_module())
        .unwrap();

    assert!(text.contains("then.1:  ; preds: entry\n"));
    assert!(text.contains("merge.2:  ; preds: entry, then.1\n"));
}

#[test]
fn test_types_can_be_omitted() {
    let emitter = TextEmitter::new(EmitterConfig {
        include_types: false,
        indent_style: IndentStyle::Tabs,
        ..EmitterConfig::plain()
    });
    let text = emitter.emit_to_string(&sample_module()).unwrap();

    assert!(text.contains("\t%t2 = fmul %t0, %t1\n"));
    assert!(text.contains("\t%slot0 = alloca  ; x\n"));
}
