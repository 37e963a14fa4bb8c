use std::{env, io, process};

use basalt_lang::basalt;

fn main() {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let ast_enabled = args.iter().any(|arg| arg == "-ast");
    args.retain(|arg| arg != "-ast");

    let mut stdout = io::stdout();
    let mut basalt = basalt::new(&mut stdout);

    if ast_enabled {
        basalt.enable_ast();
    }

    match args.len() {
        0 => basalt.run_prompt(),
        1 => basalt.run_file(&args[0]),
        _ => {
            println!("Usage: basalt [-ast] [script]");
            process::exit(64);
        },
    };
}
