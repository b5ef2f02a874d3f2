use nodesift::{html, web, Error, Selector};
use tracing::{error, info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

struct Args {
    pub input: String,
    pub selector: String,
    pub trace: bool,
    pub first: bool,
    pub text: bool,
    pub attr: Option<String>,
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: nodesift [--trace] [--first] [--text | --attr NAME] <INPUT> <SELECTOR>");
            std::process::exit(2);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish()
            .init();
        info!("Logger initialized");
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = pico_args::Arguments::from_env();
    let args = Args {
        trace: pargs.contains(["-t", "--trace"]),
        first: pargs.contains(["-f", "--first"]),
        text: pargs.contains("--text"),
        attr: pargs.opt_value_from_str(["-a", "--attr"])?,
        input: pargs.free_from_str()?,
        selector: pargs.free_from_str()?,
    };
    Ok(args)
}

fn run(args: &Args) -> Result<(), Error> {
    let selector = Selector::compile(&args.selector);
    if !selector.is_valid() {
        return Err(Error::InvalidSelector(args.selector.clone()));
    }

    let page = web::get_text_resource(&args.input)?;
    let root = {
        let span = span!(Level::DEBUG, "Parsing document", bytes = page.len());
        let _enter = span.enter();
        html::parse(&page)
    };

    let mut matches = selector.select(&root);
    info!(matches = matches.len(), "Selected nodes");
    if args.first {
        matches.truncate(1);
    }
    for node in matches {
        match &args.attr {
            Some(name) => {
                if let Some(value) = node.attribute(name) {
                    println!("{}", value);
                }
            }
            None if args.text => println!("{}", node.data),
            None => println!("{}", node),
        }
    }
    Ok(())
}
