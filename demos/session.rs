use log::info;
use omnicalc::history::{History, HistoryStore, MemoryStorage, SharedHistory};
use omnicalc::session::Calculator;
use omnicalc::{AngleUnit, CalcMode, Engine};

fn main() {
    pretty_env_logger::init();

    let history = SharedHistory::new(History::open(HistoryStore::new(MemoryStorage::new())));
    let mut calculator = Calculator::new(Engine::new(), history);

    let inputs: &[&[&str]] = &[
        &["2", "+", "2", "×", "2", "="],
        &["AC", "2", "^", "3", "^", "2", "="],
        &["AC", "√", "(", "-", "1", ")", "="],
        &["AC", "1", "÷", "3", "="],
        &["AC", "5", "!", "="],
    ];

    for keys in inputs {
        for key in keys.iter() {
            calculator.handle_input(key);
        }
        println!("{:>12} = {}", calculator.expression(), calculator.result());
        if let Some(err) = calculator.last_error() {
            println!("{:>12}   ({})", "", err);
        }
    }

    calculator.set_mode(CalcMode::Scientific);
    calculator.set_angle_unit(AngleUnit::Degrees);
    for key in ["AC", "sin(", "90", ")", "="] {
        calculator.handle_input(key);
    }
    println!("{:>12} = {} (degrees)", calculator.expression(), calculator.result());

    calculator.set_mode(CalcMode::Programmer);
    for (base, digits) in calculator.base_view() {
        println!("{:>12} = {}", base.label(), digits);
    }

    info!("{} history entries", calculator.history().len());
    for item in calculator.history().items() {
        println!("history: {} = {}", item.expression, item.result);
    }
}
