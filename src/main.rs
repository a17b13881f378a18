//! Command line front end: generate, transform and integrate from the shell,
//! or stream raw generator output for external statistical test suites.

use std::io::Write;

use clap::{Parser, Subcommand};
use rand_montecarlo::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rand_montecarlo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print results as JSON (requires the serde feature)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate uniform values
    Generate {
        #[arg(short, long, default_value = "mersenne")]
        algorithm: String,
        #[arg(short, long)]
        seed: Option<i64>,
        #[arg(short, long, default_value = "10")]
        count: u64,
        /// Generator parameter, key=value or key=v1,v2,...
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Generate uniform values and transform them to another distribution
    Transform {
        #[arg(short, long)]
        distribution: String,
        #[arg(short, long, default_value = "mersenne")]
        algorithm: String,
        #[arg(short, long)]
        seed: Option<i64>,
        #[arg(short, long, default_value = "10")]
        count: u64,
        /// Generator and distribution parameters, key=value or key=v1,v2,...
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Integrate the polynomial c0 + c1 x + c2 x^2 + ... over [a, b]
    IntegratePoly {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        coefficients: Vec<f64>,
        #[arg(short, allow_hyphen_values = true)]
        a: f64,
        #[arg(short, allow_hyphen_values = true)]
        b: f64,
        #[arg(short = 'n', long, default_value = "10000")]
        points: u64,
        #[arg(long, default_value = "mersenne")]
        algorithm: String,
        #[arg(short, long)]
        seed: Option<i64>,
    },

    /// Write raw 32-bit output to stdout until the pipe closes
    Stream {
        #[arg(short, long, default_value = "mersenne")]
        algorithm: String,
        #[arg(short, long, default_value = "1")]
        seed: u32,
    },
}

fn parse_params(raw: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for item in raw {
        let (key, value) = item.split_once('=').ok_or_else(|| Error::InvalidParameter {
            name: item.clone(),
            reason: "expected key=value".to_string(),
        })?;
        let numbers = value
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<core::result::Result<Vec<f64>, _>>()
            .map_err(|e| Error::InvalidParameter { name: key.to_string(), reason: e.to_string() })?;
        let value = match numbers.as_slice() {
            [x] if !value.contains(',') => ParamValue::Number(*x),
            _ => ParamValue::List(numbers),
        };
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

fn print_values(values: &[f64], json: bool) -> Result<()> {
    if json {
        return print_json(values);
    }
    for x in values {
        println!("{}", x);
    }
    Ok(())
}

fn print_record(record: &IntegrationRecord, json: bool) -> Result<()> {
    if json {
        return print_json(record);
    }
    println!("expression: {}", record.expression);
    println!("interval:   [{}, {}]", record.a, record.b);
    println!("points:     {}", record.n_points);
    println!("result:     {}", record.result);
    println!("error:      {}", record.error);
    Ok(())
}

#[cfg(feature = "serde")]
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| Error::InvalidInput(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn print_json<T: ?Sized>(_value: &T) -> Result<()> {
    Err(json_unavailable())
}

fn json_unavailable() -> Error {
    Error::InvalidParameter {
        name: "json".to_string(),
        reason: "this binary was built without the serde feature".to_string(),
    }
}

fn stream(algorithm: &str, seed: u32) -> Result<()> {
    let mut rng: Box<dyn RngCore> = match algorithm.parse::<Algorithm>()? {
        Algorithm::Mersenne => Box::new(MersenneTwister::new(seed)),
        Algorithm::Xorshift32 => Box::new(Xorshift32::new(seed)),
        other => {
            return Err(Error::InvalidParameter {
                name: "algorithm".to_string(),
                reason: format!("{} has no raw 32-bit stream; use mersenne or xorshift32", other),
            })
        }
    };
    let mut stdout = std::io::stdout();
    let mut buffer = vec![0u8; 0x10000];
    loop {
        rng.fill_bytes(&mut buffer);
        if stdout.write_all(&buffer).is_err() {
            // Reader went away.
            return Ok(());
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Fail before generating anything rather than after.
    if cli.json && !cfg!(feature = "serde") {
        return Err(json_unavailable());
    }
    match cli.command {
        Commands::Generate { algorithm, seed, count, params } => {
            let values = generate_numbers(count, &algorithm, seed, &parse_params(&params)?)?;
            print_values(&values, cli.json)?;
        }
        Commands::Transform { distribution, algorithm, seed, count, params } => {
            let params = parse_params(&params)?;
            let uniform = generate_numbers(count, &algorithm, seed, &params)?;
            print_values(&transform(&distribution, &uniform, &params)?, cli.json)?;
        }
        Commands::IntegratePoly { coefficients, a, b, points, algorithm, seed } => {
            let polynomial = Polynomial::new(coefficients);
            let text = polynomial
                .coefficients()
                .iter()
                .enumerate()
                .map(|(k, c)| format!("{}*x^{}", c, k))
                .collect::<Vec<_>>()
                .join(" + ");
            let compiler = |_: &str| -> core::result::Result<Polynomial, EvalError> { Ok(polynomial.clone()) };
            let mut request = IntegrationRequest::new(&text, a, b).n_points(points).algorithm(&algorithm);
            request.seed = seed;
            let record = monte_carlo_integration(&compiler, &request)?;
            info!(exact = polynomial.integral(a, b), "integration complete");
            print_record(&record, cli.json)?;
        }
        Commands::Stream { algorithm, seed } => stream(&algorithm, seed)?,
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)] mod tests {
    use super::*;

    #[test] fn params_from_command_line() {
        let p = parse_params(&["lambda=2.5".to_string(), "taps=7,5".to_string()]).unwrap();
        assert_eq!(Some(&ParamValue::Number(2.5)), p.get("lambda"));
        assert_eq!(Some(&ParamValue::List(vec![7.0, 5.0])), p.get("taps"));
        assert!(parse_params(&["lambda".to_string()]).is_err());
        assert!(parse_params(&["lambda=two".to_string()]).is_err());
    }

    #[cfg(not(feature = "serde"))]
    #[test] fn json_output_needs_serde() {
        let err = print_values(&[0.5], true).unwrap_err();
        assert!(err.to_string().contains("serde"));
        assert!(print_values(&[0.5], false).is_ok());
        let cli = Cli::parse_from(["rand_montecarlo", "--json", "generate", "-s", "1"]);
        assert_eq!(ErrorKind::Configuration, run(cli).unwrap_err().kind());
    }

    #[cfg(feature = "serde")]
    #[test] fn json_output_with_serde() {
        assert!(print_values(&[0.5], true).is_ok());
    }
}
