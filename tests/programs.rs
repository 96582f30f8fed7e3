mod common;

use common::{run, stack, translate, ARG, LCL, SP, THAT, THIS};

use hackvm::{error::Error, translator::TranslateError, vm::parser::ErrorKind, Translator};

#[test]
fn test_simple_add() {
    let emulator = run("SimpleAdd", include_str!("SimpleAdd.vm"));

    assert_eq!(emulator.memory[SP], 257);
    assert_eq!(stack(&emulator), vec![15]);
}

#[test]
fn test_simple_add_text() {
    let translation = translate("SimpleAdd", include_str!("SimpleAdd.vm"));

    let expected = "\
@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n\
@8\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n\
@SP\nAM=M-1\nD=M\n@SP\nAM=M-1\nD=D+M\nM=D\n@SP\nM=M+1\n";

    assert_eq!(translation.to_string(), expected);
}

#[test]
fn test_stack_test() {
    let emulator = run("StackTest", include_str!("StackTest.vm"));

    assert_eq!(emulator.memory[SP], 266);
    assert_eq!(stack(&emulator), vec![-1, 0, 0, 0, -1, 0, -1, 0, 0, -91]);
}

#[test]
fn test_basic_test() {
    let emulator = run("BasicTest", include_str!("BasicTest.vm"));

    assert_eq!(stack(&emulator), vec![472]);
    assert_eq!(emulator.memory[300], 10);
    assert_eq!(emulator.memory[401], 21);
    assert_eq!(emulator.memory[402], 22);
    assert_eq!(emulator.memory[3006], 36);
    assert_eq!(emulator.memory[3012], 42);
    assert_eq!(emulator.memory[3015], 45);
    assert_eq!(emulator.memory[11], 510);

    // Segment bases are untouched.
    assert_eq!(emulator.memory[LCL], 300);
    assert_eq!(emulator.memory[ARG], 400);
}

#[test]
fn test_pointer_test() {
    let emulator = run("PointerTest", include_str!("PointerTest.vm"));

    assert_eq!(stack(&emulator), vec![6084]);
    assert_eq!(emulator.memory[THIS], 3030);
    assert_eq!(emulator.memory[THAT], 3040);
    assert_eq!(emulator.memory[3032], 32);
    assert_eq!(emulator.memory[3046], 46);
}

#[test]
fn test_static_test() {
    let translation = translate("StaticTest", include_str!("StaticTest.vm"));
    let image = common::assemble(&translation.to_string());

    assert_eq!(image.variables.len(), 3);
    assert!(image.variables.contains_key("StaticTest.8"));

    let static8 = image.variables["StaticTest.8"] as usize;
    let emulator = common::execute(image);

    assert_eq!(stack(&emulator), vec![1110]);
    assert_eq!(emulator.memory[static8], 888);
}

#[test]
fn test_annotated_output_assembles() {
    let translation = Translator::new("BasicTest")
        .annotate(true)
        .translate_source(include_str!("BasicTest.vm"))
        .unwrap();

    let text = translation.to_string();
    assert!(text.starts_with("// push constant 10\n@10\n"));
    assert!(text.contains("// pop that 5\n"));

    let emulator = common::execute(common::assemble(&text));
    assert_eq!(stack(&emulator), vec![472]);
}

#[test]
fn test_broken_program() {
    let err = Translator::new("Broken")
        .translate_source(include_str!("Broken.vm"))
        .unwrap_err();

    assert_eq!(err.line, 5);
    assert_eq!(err.text, "pop locl 0");
    match err.error {
        Error::Parse(ref err) => assert_eq!(
            err.kind,
            ErrorKind::UnknownSegment { word: "locl".into(), suggestion: Some("local") }
        ),
        ref other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_source_map_matches_assembly() {
    let translation = translate("StackTest", include_str!("StackTest.vm"));
    let image = common::assemble(&translation.to_string());

    assert_eq!(translation.source_map.len(), image.words.len());

    // The first `eq` is on line 5, its label points just past the "false" write.
    let label = image.labels["eq$true.0"] as usize;
    assert_eq!(translation.source_map.get_source_line(label - 1), Some(5));
    assert_eq!(translation.source_map.get_source_line(label), Some(5));
}

#[test]
fn test_unit_name_from_file_stem_is_checked() {
    let source = "push constant 1\npop static 0\n";

    for unit in &["my-file", "1st"] {
        let err = Translator::new(*unit).translate_source(source).unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.error, Error::Translate(TranslateError::InvalidUnit(unit.to_string())));
    }

    // A unit without statics never needs the name.
    assert!(Translator::new("my-file").translate_source("push constant 1\n").is_ok());

    let translation = translate("my_file", source);
    let image = common::assemble(&translation.to_string());
    assert!(image.variables.contains_key("my_file.0"));
}
