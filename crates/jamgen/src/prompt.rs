//! Minimal interactive prompts over stdin for the maintenance commands.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Ask a question and return the (possibly empty) answer.
pub fn ask(question: &str) -> Result<String> {
    print!("{question}: ");
    io::stdout().flush()?;
    read_line()
}

/// Ask a question with a default used for an empty answer.
pub fn ask_default(question: &str, default: &str) -> Result<String> {
    print!("{question} [{default}]: ");
    io::stdout().flush()?;
    let answer = read_line()?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

/// Ask a question until a non-empty answer is given.
pub fn ask_required(question: &str) -> Result<String> {
    loop {
        let answer = ask(question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        println!("A value is required.");
    }
}

/// Yes/no question.
pub fn confirm(question: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    print!("{question} [{hint}]: ");
    io::stdout().flush()?;

    let answer = read_line()?.to_ascii_lowercase();
    Ok(match answer.as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Pick one entry from a numbered list. Returns the chosen index.
pub fn choose(question: &str, options: &[String]) -> Result<usize> {
    println!("{question}");
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;
        let answer = read_line()?;
        if let Ok(n) = answer.parse::<usize>() {
            if n >= 1 && n <= options.len() {
                return Ok(n - 1);
            }
        }
        println!("Enter a number between 1 and {}.", options.len());
    }
}

/// Ask repeatedly until an empty answer ends the list.
pub fn ask_list(question: &str) -> Result<Vec<String>> {
    let mut items = Vec::new();
    println!("{question} (empty line to finish)");
    loop {
        print!("  - ");
        io::stdout().flush()?;
        let answer = read_line()?;
        if answer.is_empty() {
            return Ok(items);
        }
        items.push(answer);
    }
}
