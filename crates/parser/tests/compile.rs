use mjc_codegen::{Code, OpCode};
use mjc_errors::Errors;
use mjc_lexer::Scanner;
use mjc_parser::Parser;

fn compile(source: &str) -> (Code, Errors) {
    let mut parser = Parser::new(Scanner::new(source));
    parser.parse();
    parser.finish()
}

#[test]
fn minimal_program() {
    let (code, errors) = compile(
        "program P {
           void main() { }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert_eq!(code.data_size, 0);
    assert!(code.main_pc >= 0);

    // static initializer occupies pc 0..5
    let buf = code.buf();
    assert_eq!(buf[0], OpCode::Enter.code());
    assert_eq!(buf[3], OpCode::Exit.code());
    assert_eq!(buf[4], OpCode::Return.code());
}

#[test]
fn main_calls_static_initializer_first() {
    let (code, errors) = compile(
        "program P
           int total = 42;
         {
           void main() { print(total); }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());

    // enter nPars nVars, then the call back to pc 0
    let mp = code.main_pc as usize;
    let buf = code.buf();
    assert_eq!(buf[mp], OpCode::Enter.code());
    assert_eq!(buf[mp + 3], OpCode::Call.code());
    let disp = i16::from_be_bytes([buf[mp + 4], buf[mp + 5]]);
    assert_eq!(disp as i32, -((mp + 3) as i32));
}

#[test]
fn loop_with_compound_assignment() {
    let (code, errors) = compile(
        "program P
           final int size = 10;
           int total;
         {
           int square(int n) { return n * n; }

           void main() int i; {
             i = 0;
             while (i < size) {
               total += square(i);
               i++;
             }
             print(total);
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert_eq!(code.data_size, 1);
    assert!(code.main_pc >= 0);
}

#[test]
fn global_initializer_assigns_every_variable() {
    let (code, errors) = compile(
        "program P
           int a, b = 7;
         {
           void main() { print(a + b); }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert_eq!(code.data_size, 2);
    // the value is duplicated once for the two stores
    assert!(code.buf().contains(&OpCode::Dup.code()));
}

#[test]
fn singleton_is_allocated_and_initialized() {
    let (code, errors) = compile(
        "program P
           singleton cfg { int width; int height; } (640, 480)
         {
           void main() { print(cfg.width); }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert_eq!(code.data_size, 1);
    assert!(code.buf().contains(&OpCode::New.code()));
}

#[test]
fn singleton_initializer_count_must_match_fields() {
    let (_, errors) = compile(
        "program P
           singleton cfg { int width; int height; } (640)
         {
           void main() { }
         }",
    );

    assert_eq!(errors.count(), 1, "{}", errors.dump());
    assert!(errors.all()[0].contains("less initializers than fields"));
}

#[test]
fn array_element_compound_assignment_duplicates_address_pair() {
    let (code, errors) = compile(
        "program P
           int[] a;
         {
           void main() {
             a = new int[4];
             a[0] += 1;
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert!(code.buf().contains(&OpCode::Dup2.code()));
}

#[test]
fn builtins_and_char_arrays() {
    let (code, errors) = compile(
        "program P
           char[] buf;
         {
           void main() int i; char c; {
             buf = new char[10];
             i = len(buf);
             c = chr(i);
             i = ord(c);
             buf[0] = c;
             print(c);
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    let buf = code.buf();
    assert!(buf.contains(&OpCode::ArrayLength.code()));
    assert!(buf.contains(&OpCode::BAStore.code()));
    assert!(buf.contains(&OpCode::BPrint.code()));
}

#[test]
fn short_circuit_condition_emits_both_jump_directions() {
    let (code, errors) = compile(
        "program P {
           void main() int a; int b; {
             a = 1;
             b = 2;
             if (a < b || b < a) print(a);
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    let buf = code.buf();
    // `||` takes a jlt when the first comparison holds, the last factor
    // falls through on jge
    assert!(buf.contains(&OpCode::Jlt.code()));
    assert!(buf.contains(&OpCode::Jge.code()));
}

#[test]
fn missing_main_is_reported() {
    let (code, errors) = compile("program P { }");

    assert_eq!(code.main_pc, -1);
    assert_eq!(errors.count(), 1, "{}", errors.dump());
    assert!(errors.all()[0].contains("mainPC is -1, main not found"));
    assert!(errors.all()[0].starts_with("-- line "));
}

#[test]
fn main_contract_violations() {
    let (_, errors) = compile(
        "program P {
           void main(int argc) { }
         }",
    );
    assert!(errors
        .all()
        .iter()
        .any(|e| e.contains("main method must not have any parameters")));

    let (_, errors) = compile(
        "program P {
           int main() { return 0; }
         }",
    );
    assert!(errors
        .all()
        .iter()
        .any(|e| e.contains("main method must return void")));
}

#[test]
fn redeclaration_reported_once_first_wins() {
    let (_, errors) = compile(
        "program P
           int x;
           int x;
         {
           void main() { x = 1; }
         }",
    );

    assert_eq!(errors.count(), 1, "{}", errors.dump());
    assert!(errors.all()[0].contains("x already declared"));
}

#[test]
fn error_rate_limiter_suppresses_cascades() {
    // the second bad statement follows within three tokens of the first
    let (_, errors) = compile(
        "program P {
           void main() { ] ; ] ; }
         }",
    );
    assert_eq!(errors.count(), 1, "{}", errors.dump());

    // with enough healthy tokens in between, both are reported
    let (_, errors) = compile(
        "program P {
           void main() int i; { ] ; i = 1 ; ] ; }
         }",
    );
    assert_eq!(errors.count(), 2, "{}", errors.dump());
}

#[test]
fn incompatible_assignment_is_reported() {
    let (_, errors) = compile(
        "program P {
           void main() int i; {
             i = 'c';
           }
         }",
    );

    assert_eq!(errors.count(), 1, "{}", errors.dump());
    assert!(errors.all()[0].contains("incompatible types"));
}

#[test]
fn void_method_cannot_be_used_as_value() {
    let (_, errors) = compile(
        "program P {
           void f() { }
           void main() int i; {
             i = f();
           }
         }",
    );

    assert!(errors
        .all()
        .iter()
        .any(|e| e.contains("invalid call of void method")));
}

#[test]
fn break_outside_loop() {
    let (_, errors) = compile(
        "program P {
           void main() { break; }
         }",
    );

    assert_eq!(errors.count(), 1, "{}", errors.dump());
    assert!(errors.all()[0].contains("break is not within a loop"));
}

#[test]
fn break_leaves_the_loop() {
    let (_, errors) = compile(
        "program P {
           void main() int i; {
             i = 0;
             while (i < 10) {
               if (i == 5) break;
               i++;
             }
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
}

#[test]
fn reading_into_char_uses_byte_read() {
    let (code, errors) = compile(
        "program P {
           void main() char c; {
             read(c);
             print(c);
           }
         }",
    );

    assert_eq!(errors.count(), 0, "{}", errors.dump());
    assert!(code.buf().contains(&OpCode::BRead.code()));
}

#[test]
fn object_file_header_matches_compiled_code() {
    let (code, errors) = compile(
        "program P
           int g;
         {
           void main() { g = 3; }
         }",
    );
    assert_eq!(errors.count(), 0, "{}", errors.dump());

    let mut out = Vec::new();
    code.write(&mut out).unwrap();

    assert_eq!(&out[0..2], b"MJ");
    assert_eq!(i32::from_be_bytes(out[2..6].try_into().unwrap()), code.pc() as i32);
    assert_eq!(i32::from_be_bytes(out[6..10].try_into().unwrap()), 1);
    assert_eq!(i32::from_be_bytes(out[10..14].try_into().unwrap()), code.main_pc);
    assert_eq!(out.len(), 14 + code.pc());
}
