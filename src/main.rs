use std::env;
use std::io::{self, BufRead, Write};

use colored::Colorize;
use serde_json::Map;

use recipe_robot::config::Settings;
use recipe_robot::pipeline::RecipePipeline;
use recipe_robot::protocol::{ContinueRequest, GenerateRequest, GenerateResponse, RecipeResponse};

fn main() {
    let settings = Settings::from_env();
    let mut args = env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "борщ".to_string());
    let robot_model = args.next().unwrap_or_else(|| "chef1".to_string());

    let pipeline = RecipePipeline::from_settings(&settings);
    let request = GenerateRequest {
        query,
        lang: "ru".into(),
        robot_model,
        constraints: Map::new(),
    };

    let mut response = match pipeline.start(request) {
        Ok(resp) => resp,
        Err(e) => {
            eprintln!("{} {} ({})", "error:".red().bold(), e, e.code());
            std::process::exit(1);
        }
    };

    // One clarification round over stdin, then give up or print the result.
    if response.result.is_none() {
        let answers = collect_answers(&response);
        response = match pipeline.resume(ContinueRequest {
            session_id: response.session_id,
            answers,
        }) {
            Ok(resp) => resp,
            Err(e) => {
                eprintln!("{} {} ({})", "error:".red().bold(), e, e.code());
                std::process::exit(1);
            }
        };
    }

    match &response.result {
        Some(result) => print_result(result),
        None => {
            println!("{}", "--- STILL OPEN ---".cyan().bold());
            for q in &response.questions {
                println!("  {q}");
            }
            println!("session: {}", response.session_id);
        }
    }
}

fn collect_answers(response: &GenerateResponse) -> Map<String, serde_json::Value> {
    println!("{}", "--- QUESTIONS ---".cyan().bold());
    let stdin = io::stdin();
    let mut answers = Map::new();
    for (i, question) in response.questions.iter().enumerate() {
        let key = question
            .get("key")
            .and_then(|k| k.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("q{}", i + 1));
        let text = question
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or(key.as_str());
        print!("{} {} > ", text.bold(), format!("[{key}]").dimmed());
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            break;
        }
        let line = line.trim();
        if !line.is_empty() {
            answers.insert(key, serde_json::Value::String(line.to_string()));
        }
    }
    answers
}

fn print_result(result: &RecipeResponse) {
    println!("{}", result.localized.title.bold());
    println!("{}", "--- INGREDIENTS ---".green().bold());
    for line in &result.localized.ingredients {
        println!("  {line}");
    }
    println!("{}", "--- PROGRAM ---".green().bold());
    for (i, step) in result.robot_program.iter().enumerate() {
        let mut line = format!("{:>2}. {} {}s", i + 1, step.mode, step.duration_sec);
        if let Some(speed) = step.speed {
            line.push_str(&format!(" speed {speed}"));
        }
        if let Some(temp) = step.temperature_c {
            line.push_str(&format!(" {temp}°C"));
        }
        if let Some(attachment) = &step.attachment {
            line.push_str(&format!(" [{attachment}]"));
        }
        println!("  {line}");
    }
    if !result.manual_steps.is_empty() {
        println!("{}", "--- MANUAL ---".green().bold());
        for step in &result.manual_steps {
            println!("  {step}");
        }
    }
    for warning in &result.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    if !result.source_urls.is_empty() {
        println!("{}", "--- SOURCES ---".dimmed());
        for url in &result.source_urls {
            println!("  {}", url.dimmed());
        }
    }
}
