use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Collapse text to its first line and cut it to `max_len` characters
pub fn truncate(text: &str, max_len: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    let multiline = text.trim_end().contains('\n');
    let count = first.chars().count();

    if count <= max_len && !multiline {
        first.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let keep = count.min(max_len - 3);
        format!("{}...", first.chars().take(keep).collect::<String>())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("task-42", 20), "task-42");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("", 10), "");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(
            truncate("arn:aws:ecs:us-east-1:123:task/main/abc", 15),
            "arn:aws:ecs:..."
        );
    }

    #[test]
    fn test_truncate_multiline() {
        assert_eq!(truncate("line one\nline two", 40), "line one...");
        assert_eq!(truncate("only\n", 40), "only");
    }

    #[test]
    fn test_truncate_edge_cases() {
        assert_eq!(truncate("test", 3), "...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
