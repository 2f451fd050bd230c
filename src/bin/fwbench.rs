use console::style;

fn print_header() {
    println!(
        "{}",
        style("fwbench - embedded firmware workspace bootstrapper").cyan()
    );
    println!();
}

fn run() -> Result<(), String> {
    print_header();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = fwbench::run(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
