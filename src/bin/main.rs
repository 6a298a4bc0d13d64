#![allow(non_upper_case_globals)]

#[macro_use]
extern crate lazy_static;

use std::{
    panic::{self},
    path::{PathBuf},
    process::{self},
    sync::{Mutex},
};

use clap::{
    Arg, App, AppSettings, Result as ClapResult,
};

use ordict::{
    panick, fatal, create_message, headed_message, append, breakline,
    app::{OrderConfig},
    io::{PrintedPanic, MutedOutput},
};

lazy_static! {
    static ref PanicMessage: Mutex<String> = {
        Mutex::new(String::new())
    };
}

struct Order {
    config: OrderConfig,
}
impl Order {
    pub fn parse_cli() -> ClapResult<Order> {
        let app = Order::build_cli_parser();
        let config = Order::parse_cli_options(app)?;
        Ok(Order {
            config: config,
        })
    }
    pub fn run(self) -> bool {
        self.config.run()
    }
    fn build_cli_parser<'a, 'b>() -> App<'a, 'b> {
        App::new(env!("CARGO_PKG_NAME"))
        .setting(AppSettings::ColoredHelp)
        .set_term_width(80usize)
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("QUIET")
            .long("quiet")
            .help("suppresses progress and stats messages"))
        .arg(Arg::with_name("STATS")
            .long("stats")
            .help("prints statistics"))
        .arg(Arg::with_name("INPUT")
            .index(1u64)
            .required(true)
            .help("path to the input text file"))
        .arg(Arg::with_name("OUTPUT")
            .index(2u64)
            .required(true)
            .help("path to the output file, or - for standard output"))
    }
    fn parse_cli_options(app: App<'_, '_>) -> ClapResult<OrderConfig> {
        let matches = app.get_matches_safe()?;
        if matches.is_present("QUIET") {
            MutedOutput.lock().unwrap().mute();
        }
        let input = {
            let mut pb = PathBuf::new();
            pb.push(matches.value_of("INPUT").unwrap());
            pb
        };
        let output = match matches.value_of("OUTPUT").unwrap() {
            "-" => None,
            val => {
                let mut pb = PathBuf::new();
                pb.push(val);
                Some(pb)
            },
        };
        let stats = matches.is_present("STATS");
        Ok(OrderConfig {
            input: input,
            output: output,
            stats: stats,
        })
    }
}

fn main() {
    panic::set_hook(Box::new(|info| {
        *PanicMessage.lock().unwrap() = format!("{}", info)
    }));
    match panic::catch_unwind(run) {
        Ok(success) => if success {
            process::exit(0)
        } else {
            process::exit(1)
        },
        Err(pain) => {
            match pain.downcast::<PrintedPanic>() {
                Ok(pp) => eprint!("{}", pp),
                Err(_) => {
                    fatal!("unexpected runtime error", lock, {
                        append!(lock, "{}", PanicMessage.lock().unwrap());
                    })
                },
            }
            process::exit(101)
        }
    }
}

fn run() -> bool {
    match Order::parse_cli() {
        Ok(cfg) => cfg.run(),
        Err(err) => if err.use_stderr() {
            panick!("command-line argument error", lock, {
                let s = format!("{}", err);
                let n = match err.message.chars().enumerate().find(|&(_, c)| c.is_ascii_whitespace()) {
                    Some((n, _)) => n + 1usize,
                    None => 0usize,
                };
                append!(lock, "{}", &s[n ..]);
            })
        } else {
            err.exit()
        },
    }
}
