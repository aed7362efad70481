use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone)]
struct Variation {
    kind: String,
    domain: String,
}

fn find_squatwatch_binary() -> PathBuf {
    // Priority: SQUATWATCH_BIN env var
    if let Ok(path) = env::var("SQUATWATCH_BIN") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return p;
        }
    }

    // Try common relative locations from this test app directory
    let candidates = [
        "../../target/release/squatwatch",
        "../../target/debug/squatwatch",
        "../target/release/squatwatch",
        "../target/debug/squatwatch",
        "./target/release/squatwatch",
        "./target/debug/squatwatch",
    ];

    for cand in candidates {
        let p = PathBuf::from(cand);
        if p.is_file() {
            return p;
        }
    }

    // Fall back to PATH lookup
    if let Ok(paths) = env::var("PATH") {
        for dir in paths.split(':') {
            let mut p = PathBuf::from(dir);
            p.push("squatwatch");
            if p.is_file() {
                return p;
            }
        }
    }

    panic!("Unable to locate squatwatch binary. Set SQUATWATCH_BIN env var to the path of ./target/release/squatwatch.");
}

fn run_squatwatch(args: &[&str]) -> (i32, String, String) {
    let bin = find_squatwatch_binary();

    let output = Command::new(bin)
        .args(args)
        .env("SQUATWATCH_LOG", "off")
        .output()
        .expect("failed to execute squatwatch");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn generate(domain: &str, extra: &[&str]) -> Vec<Variation> {
    let mut args = vec!["generate", domain];
    args.extend_from_slice(extra);
    let (_code, stdout, _stderr) = run_squatwatch(&args);
    parse_output(&stdout)
}

fn parse_output(stdout: &str) -> Vec<Variation> {
    let mut out = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // "<kind>, <domain>"
        if let Some((kind, domain)) = line.split_once(',') {
            out.push(Variation {
                kind: kind.trim().to_string(),
                domain: domain.trim().to_string(),
            });
        }
    }
    out
}

fn assert_contains(variants: &[Variation], kind: &str, domain: &str) -> Result<(), String> {
    if variants.iter().any(|v| v.kind == kind && v.domain == domain) {
        Ok(())
    } else {
        Err(format!("Expected '{}' from {} not found in output", domain, kind))
    }
}

fn assert_absent(variants: &[Variation], domain: &str) -> Result<(), String> {
    if variants.iter().any(|v| v.domain == domain) {
        Err(format!("Unexpected domain '{}' present in output", domain))
    } else {
        Ok(())
    }
}

fn assert_only_kinds(variants: &[Variation], allowed: &[&str]) -> Result<(), String> {
    let allowed: HashSet<&str> = allowed.iter().copied().collect();
    for v in variants {
        if !allowed.contains(v.kind.as_str()) {
            return Err(format!("Unexpected mutation kind: {}", v.kind));
        }
    }
    Ok(())
}

// ====== Individual family tests ======
fn test_bitsquatting() -> Result<(), String> {
    let variants = generate("test.com", &["--kind", "bitsquatting"]);
    assert_contains(&variants, "bitsquatting", "uest.com")?; // t ^ 0x01
    assert_absent(&variants, "test.com")?;
    assert_only_kinds(&variants, &["bitsquatting"])
}

fn test_homoglyph() -> Result<(), String> {
    let variants = generate("google.com", &["--kind", "homoglyph"]);
    assert_contains(&variants, "homoglyph", "g0ogle.com")?;
    assert_contains(&variants, "homoglyph", "g00gle.com")?;
    assert_contains(&variants, "homoglyph", "qoogle.com")?;
    assert_absent(&variants, "google.com")?;
    let unique: HashSet<&str> = variants.iter().map(|v| v.domain.as_str()).collect();
    if unique.len() != variants.len() {
        return Err("Homoglyph output contains duplicates".to_string());
    }
    Ok(())
}

fn test_keyboard_families() -> Result<(), String> {
    let variants = generate(
        "test.com",
        &["--kind", "replacement", "--kind", "insertion", "--kind", "repetition"],
    );
    assert_contains(&variants, "replacement", "trst.com")?; // e -> r
    assert_contains(&variants, "insertion", "twest.com")?; // w before e
    assert_contains(&variants, "insertion", "terst.com")?; // r after e
    assert_contains(&variants, "repetition", "teest.com")?;
    // first and last characters are never insertion points
    assert_absent(&variants, "rtest.com")?;
    assert_only_kinds(&variants, &["replacement", "insertion", "repetition"])
}

fn test_structural_families() -> Result<(), String> {
    let variants = generate("test.com", &[]);
    assert_contains(&variants, "transposition", "tset.com")?;
    assert_contains(&variants, "omission", "tst.com")?;
    assert_contains(&variants, "hyphenation", "t-est.com")?;
    assert_contains(&variants, "subdomain", "t.est.com")?;
    assert_absent(&variants, "test.com")
}

fn test_limit_enforced() -> Result<(), String> {
    let variants = generate("test.com", &["--max-variations", "5"]);
    if variants.len() == 5 {
        Ok(())
    } else {
        Err(format!("Expected 5 variations, got {}", variants.len()))
    }
}

fn test_count_on_stderr() -> Result<(), String> {
    let (code, stdout, stderr) = run_squatwatch(&["generate", "test.com"]);
    if code != 0 {
        return Err(format!("Exit code {}", code));
    }
    let expected = format!("Generated {} variations", parse_output(&stdout).len());
    if stderr.contains(&expected) {
        Ok(())
    } else {
        Err(format!("Expected '{}' on stderr, got '{}'", expected, stderr.trim()))
    }
}

fn test_invalid_domain_fails() -> Result<(), String> {
    let (code, stdout, _stderr) = run_squatwatch(&["generate", "not_a_domain"]);
    if code == 0 || !stdout.trim().is_empty() {
        return Err(format!("Expected failure without output, got exit code {}", code));
    }
    Ok(())
}

fn main() {
    let bin = find_squatwatch_binary();
    eprintln!("Using squatwatch binary: {}", bin.display());

    let mut failures: Vec<String> = Vec::new();

    let tests: Vec<(&str, fn() -> Result<(), String>)> = vec![
        ("bitsquatting", test_bitsquatting),
        ("homoglyph", test_homoglyph),
        ("keyboard families", test_keyboard_families),
        ("structural families", test_structural_families),
        ("limit enforced", test_limit_enforced),
        ("count on stderr", test_count_on_stderr),
        ("invalid domain fails", test_invalid_domain_fails),
    ];

    for (name, f) in &tests {
        match f() {
            Ok(()) => println!("[PASS] {}", name),
            Err(err) => {
                println!("[FAIL] {} -> {}", name, err);
                failures.push(format!("{}: {}", name, err));
            }
        }
    }

    if failures.is_empty() {
        println!("\nAll tests passed");
        std::process::exit(0);
    } else {
        println!("\n{} test(s) failed:", failures.len());
        for f in &failures {
            println!(" - {}", f);
        }
        std::process::exit(1);
    }
}
