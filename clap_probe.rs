use clap::{ArgAction, Parser};
#[derive(Debug, Parser)]
struct C {
    #[arg(long, action = ArgAction::SetTrue)]
    pub flag: Option<bool>,
}
fn main() {
    let absent = C::parse_from(["x"]);
    let present = C::parse_from(["x", "--flag"]);
    eprintln!("absent={:?} present={:?}", absent.flag, present.flag);
}
