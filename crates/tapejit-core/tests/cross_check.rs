//! Cross-check the native backend against the reference interpreter

#![cfg(all(target_arch = "x86_64", unix))]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tapejit_core::{Config, Error, Executor, Interpreter, RecordingIo, Tape, Translator};

const STEP_LIMIT: u64 = 200_000;
const INPUT: &[u8] = b"The quick brown fox";

/// Generate a random bracket-balanced program
fn random_program(rng: &mut StdRng, len: usize, depth: usize) -> String {
    let mut out = String::new();
    while out.len() < len {
        match rng.gen_range(0..20) {
            0..=5 => out.push('+'),
            6..=8 => out.push('-'),
            9..=11 => out.push('>'),
            12..=13 => out.push('<'),
            14..=15 => out.push('.'),
            16 => out.push(','),
            _ if depth < 3 => {
                out.push('[');
                let inner_len = rng.gen_range(1..8);
                out.push_str(&random_program(rng, inner_len, depth + 1));
                out.push(']');
            }
            _ => out.push('+'),
        }
    }
    out
}

/// Run on the interpreter; `None` if the program does not finish cleanly
fn interpret(source: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut io = RecordingIo::with_input(INPUT);
    let outcome = Interpreter::new(&Config::default().with_tape_size(16).with_eof_byte(0))
        .with_step_limit(STEP_LIMIT)
        .run_source(source, &mut io);
    match outcome {
        Ok(outcome) => Some((io.output, outcome.tape)),
        Err(Error::StepLimitExceeded { .. } | Error::TapeUnderflow { .. }) => None,
        Err(e) => panic!("unexpected interpreter error for {source:?}: {e}"),
    }
}

/// Run natively with room for every cell the interpreter touched
fn native(source: &str, tape_size: usize) -> (Vec<u8>, Tape) {
    let code = Translator::new().translate(source).unwrap();
    let executor = Executor::new(&Config::default().with_tape_size(tape_size).with_eof_byte(0));
    let mut io = RecordingIo::with_input(INPUT);
    let mut tape = Tape::new(tape_size).unwrap();
    executor.execute_on(&code, &mut tape, &mut io).unwrap();
    (io.output, tape)
}

fn assert_backends_agree(source: &str) -> bool {
    let Some((expected_output, expected_tape)) = interpret(source) else {
        return false;
    };
    let (output, tape) = native(source, expected_tape.len() + 16);
    assert_eq!(output, expected_output, "output differs for {source:?}");
    assert_eq!(
        &tape.cells()[..expected_tape.len()],
        expected_tape.as_slice(),
        "tape differs for {source:?}"
    );
    true
}

#[test]
fn test_known_programs_agree() {
    let programs = [
        "++.",
        "+[-]",
        ",.",
        "++++++++[>++++++++<-]>+.",
        ",[.,]",
        "+++[>+++[>+<-]<-]>>.",
        "++>+++++[<+>-]++++++++[<++++++>-]<.",
        ">>+<<[->>-<<]>>.",
        "++++[>++++<-]>[<+>-]<.",
    ];
    for source in programs {
        assert!(assert_backends_agree(source), "{source:?} did not finish");
    }
}

#[test]
fn test_random_programs_agree() {
    let mut rng = StdRng::seed_from_u64(0x7A9E_u64);
    let mut compared = 0;
    for _ in 0..400 {
        let len = rng.gen_range(1..60);
        let source = random_program(&mut rng, len, 0);
        if assert_backends_agree(&source) {
            compared += 1;
        }
    }
    // Most generated programs finish within the step bound
    assert!(compared > 50, "only {compared} programs were comparable");
}
