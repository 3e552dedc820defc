//! Object factory: class label + initializer atoms -> node
//!
//! Fallback order when no class matches: a numeric literal becomes a constant
//! float object; otherwise the label names an abstraction, searched as
//! `<label>.pd` in the patch's own directory and then the library directory;
//! failing that, the error is reported and an inert placeholder keeps the
//! connect indices stable.

use std::path::Path;

use tracing::debug;

use crate::graph::{GraphId, NodeKind, Patch};
use crate::message::Atom;
use crate::nodes::*;
use crate::object::{AudioNode, MessageNode};
use crate::patch_parser::{parse_records, Record};

/// What the factory hands back: behaviour, canonical label, and how the
/// object wants to be registered with the root.
pub(crate) struct BuiltObject {
    pub node: NodeKind,
    pub label: String,
    pub registration: Registration,
}

pub(crate) enum Registration {
    None,
    Send(String),
    Receive(String),
    SendSignal(String),
    ReceiveSignal(String),
    ThrowSignal(String),
    CatchSignal(String),
}

pub(crate) fn plain(node: Box<dyn MessageNode>) -> BuiltObject {
    let label = node.label().to_string();
    BuiltObject {
        node: NodeKind::Message(node),
        label,
        registration: Registration::None,
    }
}

pub(crate) fn audio(node: Box<dyn AudioNode>) -> BuiltObject {
    let label = node.label().to_string();
    BuiltObject {
        node: NodeKind::Audio(node),
        label,
        registration: Registration::None,
    }
}

pub(crate) fn inert(label: String) -> BuiltObject {
    BuiltObject {
        node: NodeKind::Inert,
        label,
        registration: Registration::None,
    }
}

pub(crate) fn message_box(content: Vec<Atom>) -> BuiltObject {
    plain(Box::new(MessageBoxNode::new(content)))
}

fn named(init: &[Atom]) -> Option<String> {
    init.first()
        .and_then(Atom::as_symbol)
        .map(str::to_string)
        .filter(|name| !name.is_empty())
}

/// Construct the object for `#X obj` with the given (already
/// dollar-resolved) initializer.
pub(crate) fn create(
    patch: &mut Patch,
    graph: GraphId,
    label: &str,
    init: Vec<Atom>,
    dir: &Path,
) -> BuiltObject {
    let init = init.as_slice();
    match label {
        "+" => plain(Box::new(MessageArith::new(ArithOp::Add, init))),
        "-" => plain(Box::new(MessageArith::new(ArithOp::Subtract, init))),
        "*" => plain(Box::new(MessageArith::new(ArithOp::Multiply, init))),
        "/" => plain(Box::new(MessageArith::new(ArithOp::Divide, init))),
        "pow" => plain(Box::new(MessageArith::new(ArithOp::Pow, init))),
        ">" => plain(Box::new(MessageCompare::new(CompareOp::GreaterThan, init))),
        ">=" => plain(Box::new(MessageCompare::new(
            CompareOp::GreaterOrEqual,
            init,
        ))),
        "<" => plain(Box::new(MessageCompare::new(CompareOp::LessThan, init))),
        "<=" => plain(Box::new(MessageCompare::new(CompareOp::LessOrEqual, init))),
        "==" => plain(Box::new(MessageCompare::new(CompareOp::Equal, init))),
        "!=" => plain(Box::new(MessageCompare::new(CompareOp::NotEqual, init))),
        "abs" => plain(Box::new(MessageUnary::new(UnaryOp::Abs))),
        "sqrt" => plain(Box::new(MessageUnary::new(UnaryOp::Sqrt))),
        "log" => plain(Box::new(MessageUnary::new(UnaryOp::Log))),
        "exp" => plain(Box::new(MessageUnary::new(UnaryOp::Exp))),
        "sin" => plain(Box::new(MessageUnary::new(UnaryOp::Sin))),
        "cos" => plain(Box::new(MessageUnary::new(UnaryOp::Cos))),
        "tan" => plain(Box::new(MessageUnary::new(UnaryOp::Tan))),
        "atan" => plain(Box::new(MessageUnary::new(UnaryOp::Atan))),
        "atan2" => plain(Box::new(MessageAtan2::new(init))),
        "powtodb" => plain(Box::new(MessageUnary::new(UnaryOp::PowToDb))),
        "dbtopow" => plain(Box::new(MessageUnary::new(UnaryOp::DbToPow))),
        "bang" | "bng" | "b" => plain(Box::new(MessageBang)),
        "change" => plain(Box::new(MessageChange::new(init))),
        "delay" | "del" => plain(Box::new(MessageDelay::new(init))),
        "float" | "f" => plain(Box::new(MessageFloat::from_init(init))),
        "int" | "i" => plain(Box::new(MessageInt::from_init(init))),
        "loadbang" => plain(Box::new(MessageLoadbang)),
        "metro" => plain(Box::new(MessageMetro::new(init))),
        "moses" => plain(Box::new(MessageMoses::new(init))),
        "pipe" => plain(Box::new(MessagePipe::new(init))),
        "print" => plain(Box::new(MessagePrint::new(init))),
        "random" => plain(Box::new(MessageRandom::new(init))),
        "unpack" => plain(Box::new(MessageUnpack::new(init))),
        "inlet" => plain(Box::new(MessageInletBridge)),
        "outlet" => plain(Box::new(MessageOutletBridge)),
        "inlet~" => audio(Box::new(DspInletBridge::new())),
        "outlet~" => audio(Box::new(DspOutletBridge::new())),
        "send" | "s" => match named(init) {
            Some(name) => {
                let mut built = plain(Box::new(MessageSend::new(name.clone())));
                built.registration = Registration::Send(name);
                built
            }
            None => {
                patch.print.print_err("send needs a name");
                inert(label.to_string())
            }
        },
        "receive" | "r" => match named(init) {
            Some(name) => {
                let mut built = plain(Box::new(MessageReceive::new(name.clone())));
                built.registration = Registration::Receive(name);
                built
            }
            None => {
                patch.print.print_err("receive needs a name");
                inert(label.to_string())
            }
        },
        "+~" => audio(Box::new(DspAdd::new(init))),
        "*~" => audio(Box::new(DspMultiply::new(init))),
        "adc~" => audio(Box::new(DspAdc::new(patch.config.input_channels))),
        "dac~" => audio(Box::new(DspDac::new(patch.config.output_channels))),
        "noise~" => audio(Box::new(DspNoise::new())),
        "osc~" => audio(Box::new(DspOsc::new(init))),
        "send~" | "s~" => match named(init) {
            Some(name) => {
                let mut built = audio(Box::new(DspSend::new(init)));
                built.registration = Registration::SendSignal(name);
                built
            }
            None => {
                patch.print.print_err("send~ needs a name");
                inert(label.to_string())
            }
        },
        "receive~" | "r~" => match named(init) {
            Some(name) => {
                let mut built = audio(Box::new(DspReceive::new(init)));
                built.registration = Registration::ReceiveSignal(name);
                built
            }
            None => {
                patch.print.print_err("receive~ needs a name");
                inert(label.to_string())
            }
        },
        "throw~" => match named(init) {
            Some(name) => {
                let mut built = audio(Box::new(DspThrow::new(init)));
                built.registration = Registration::ThrowSignal(name);
                built
            }
            None => {
                patch.print.print_err("throw~ needs a name");
                inert(label.to_string())
            }
        },
        "catch~" => match named(init) {
            Some(name) => {
                let mut built = audio(Box::new(DspCatch::new(init)));
                built.registration = Registration::CatchSignal(name);
                built
            }
            None => {
                patch.print.print_err("catch~ needs a name");
                inert(label.to_string())
            }
        },
        _ => fallback(patch, graph, label, init, dir),
    }
}

fn fallback(
    patch: &mut Patch,
    graph: GraphId,
    label: &str,
    init: &[Atom],
    dir: &Path,
) -> BuiltObject {
    // a bare number in an object box is a constant float store
    if let Ok(value) = label.parse::<f32>() {
        return plain(Box::new(MessageFloat::new(value)));
    }

    let library = patch.config.library_directory.clone();
    for base in [dir, library.as_path()] {
        let path = base.join(format!("{}.pd", label));
        if path.is_file() {
            debug!(label, path = %path.display(), "loading abstraction");
            match load_abstraction(patch, graph, &path, init.to_vec()) {
                Ok(built) => return built,
                Err(error) => {
                    patch
                        .print
                        .print_err(&format!("abstraction {}: {}", path.display(), error));
                }
            }
        }
    }

    patch
        .print
        .print_err(&format!("unknown object or abstraction \"{}\"", label));
    inert(label.to_string())
}

/// Parse an abstraction file as a nested graph whose arguments are the
/// instantiation atoms.
fn load_abstraction(
    patch: &mut Patch,
    parent: GraphId,
    path: &Path,
    args: Vec<Atom>,
) -> Result<BuiltObject, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let records = parse_records(&text);
    let mut iter = records.into_iter();
    match iter.next() {
        Some(Record::Canvas) => {}
        _ => return Err("the first line of the abstraction does not define a canvas".into()),
    }
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let child = patch.build_graph(&mut iter, Some(parent), args, dir)?;
    Ok(BuiltObject {
        node: NodeKind::Graph(child),
        label: "pd".into(),
        registration: Registration::None,
    })
}
