use std::{
    fs::{File, OpenOptions},
    io::{stdout, Write},
    path::{PathBuf},
    time::{Duration, Instant},
};

use either::{Either};

use crate::{
    dictionary::{OrderedDictionary},
    display::{OrderedDisplay, PreOrderDisplay},
    io::{FilePath, InputReader, OutputWriter},
};

pub struct OrderStats {
    pub lines: u64,
    pub pairs: usize,
    pub height: usize,
    pub indexing_time: Duration,
    pub dump_time: Duration,
}

pub struct OrderConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub stats: bool,
}
impl OrderConfig {
    pub fn run(&self) -> bool {
        progress!("indexing input lines...", lock, {
            append!(lock, "Reading the input file {} line by line and recording each line under its 1-based line number.",
                self.input.display());
        });
        let start = Instant::now();
        let (dict, lines) = match self.load() {
            Some(loaded) => loaded,
            None => return false,
        };
        let indexing_time = start.elapsed();
        progress!("writing dictionary dumps...", lock, {
            append!(lock, "Writing the ordered pair dump and the pre-order key dump to {}.",
                self.output.as_ref().map(|pb| format!("{}", pb.display())).unwrap_or_else(|| "standard output".to_string()));
        });
        let start = Instant::now();
        if self.dump(&dict).is_none() {
            return false;
        }
        let dump_time = start.elapsed();
        self.print_stats(&OrderStats {
            lines: lines,
            pairs: dict.size(),
            height: dict.height(),
            indexing_time: indexing_time,
            dump_time: dump_time,
        });
        success!("dictionary dumps written", lock, {
            append!(lock, "{} input lines indexed into {} pairs.", lines, dict.size());
        });
        true
    }
    fn load(&self) -> Option<(OrderedDictionary<String, u64>, u64)> {
        let file = match File::open(&self.input) {
            Ok(file) => file,
            Err(err) => {
                fatal!("could not open input file", lock, {
                    append!(lock, "{}: {}", self.input.display(), err);
                });
                return None;
            },
        };
        let mut reader = InputReader::new(file, FilePath::new(self.input.clone()));
        let mut dict = OrderedDictionary::<String, u64>::new();
        while let Some(line) = reader.next() {
            let number = reader.position().line();
            dict.set_value(line, number);
        }
        let lines = reader.position().line();
        Some((dict, lines))
    }
    fn dump(&self, dict: &OrderedDictionary<String, u64>) -> Option<()> {
        let (sink, path) = match &self.output {
            Some(pb) => {
                let file = match OpenOptions::new().create(true).write(true).truncate(true).open(pb) {
                    Ok(file) => file,
                    Err(err) => {
                        fatal!("could not open output file", lock, {
                            append!(lock, "{}: {}", pb.display(), err);
                        });
                        return None;
                    },
                };
                (Either::Left(file), FilePath::new(pb.clone()))
            },
            None => (Either::Right(stdout()), FilePath::new(PathBuf::from("-"))),
        };
        let mut out = OutputWriter::new(sink, path);
        write!(out, "{}", OrderedDisplay(dict)).unwrap();
        write!(out, "\n").unwrap();
        write!(out, "{}", PreOrderDisplay(dict)).unwrap();
        write!(out, "\n").unwrap();
        out.flush().unwrap();
        Some(())
    }
    fn print_stats(&self, stats: &OrderStats) {
        if self.stats {
            info!("Line indexing stats", lock, {
                append!(lock, "{:.<30} {}", "input lines", stats.lines);
                breakline!(lock);
                append!(lock, "{:.<30} {}", "stored pairs", stats.pairs);
                breakline!(lock);
                append!(lock, "{:.<30} {}", "tree height", stats.height);
                breakline!(lock);
                append!(lock, "{:.<30} {}ms", "indexing runtime", stats.indexing_time.as_millis());
                breakline!(lock);
                append!(lock, "{:.<30} {}ms", "dump runtime", stats.dump_time.as_millis());
            });
        }
    }
}
