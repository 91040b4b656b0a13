//! robots.txt parser and rule evaluation.
//!
//! Supports the subset of the format that matters for path permissions:
//! - `User-agent` groups (consecutive agent lines share one rule set)
//! - `Allow` / `Disallow` with `*` wildcards and a trailing `$` anchor
//! - Longest matching pattern wins; `Allow` wins a tie

use regex::Regex;

/// A single `Allow` or `Disallow` line.
#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    /// Pattern length, used for precedence.
    specificity: usize,
    matcher: Regex,
}

/// Rules for one group of user-agents.
#[derive(Debug, Clone, Default)]
struct Group {
    /// Lower-cased agent tokens naming this group.
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Parsed robots.txt document.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

impl RobotsTxt {
    /// Parse robots.txt content. Unknown directives and malformed lines are ignored.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current = Group::default();
        // A user-agent line after rules starts a new group.
        let mut saw_rule = false;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match directive.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if saw_rule {
                        groups.push(std::mem::take(&mut current));
                        saw_rule = false;
                    }
                    // A bare token would match every agent.
                    if !value.is_empty() {
                        current.agents.push(value.to_lowercase());
                    }
                }
                "allow" | "disallow" => {
                    saw_rule = true;
                    // An empty Disallow means "allow everything"; nothing to record.
                    if value.is_empty() {
                        continue;
                    }
                    let allow = directive.trim().eq_ignore_ascii_case("allow");
                    if let Some(matcher) = pattern_to_regex(value) {
                        current.rules.push(Rule {
                            allow,
                            specificity: value.len(),
                            matcher,
                        });
                    }
                }
                _ => {}
            }
        }

        if !current.agents.is_empty() {
            groups.push(current);
        }

        Self { groups }
    }

    /// Check whether `path` (path plus optional query) may be fetched by `user_agent`.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let Some(group) = self.group_for(user_agent) else {
            return true;
        };

        let winner = group
            .rules
            .iter()
            .filter(|r| r.matcher.is_match(path))
            .max_by(|a, b| {
                a.specificity
                    .cmp(&b.specificity)
                    .then_with(|| a.allow.cmp(&b.allow))
            });

        winner.is_none_or(|r| r.allow)
    }

    /// Select the group for an agent: a named group whose token appears in the
    /// agent string, else the `*` group.
    fn group_for(&self, user_agent: &str) -> Option<&Group> {
        let agent = user_agent.to_lowercase();

        self.groups
            .iter()
            .find(|g| {
                g.agents
                    .iter()
                    .any(|token| token != "*" && agent.contains(token.as_str()))
            })
            .or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|t| t == "*")))
    }
}

/// Convert a robots.txt path pattern to an anchored regex.
fn pattern_to_regex(pattern: &str) -> Option<Regex> {
    let (body, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };
    let escaped = regex::escape(body).replace(r"\*", ".*");
    let suffix = if anchored { "$" } else { "" };
    Regex::new(&format!("^{escaped}{suffix}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "herodex/0.1.0";

    #[test]
    fn parse_basic() {
        let robots = RobotsTxt::parse(
            r#"
User-agent: *
Disallow: /private/
Disallow: /admin/
Allow: /public/
Crawl-delay: 2

Sitemap: https://example.com/sitemap.xml
"#,
        );

        assert!(robots.is_allowed(AGENT, "/public/page"));
        assert!(!robots.is_allowed(AGENT, "/private/page"));
        assert!(!robots.is_allowed(AGENT, "/admin/"));
        assert!(robots.is_allowed(AGENT, "/wiki/Hela"));
    }

    #[test]
    fn specific_agent_group_wins_over_star() {
        let robots = RobotsTxt::parse(
            r#"
User-agent: *
Disallow: /

User-agent: herodex
Disallow:
"#,
        );

        assert!(!robots.is_allowed("OtherBot/2.0", "/wiki/Hela"));
        assert!(robots.is_allowed(AGENT, "/wiki/Hela"));
    }

    #[test]
    fn longest_match_takes_precedence() {
        let robots = RobotsTxt::parse(
            r#"
User-agent: *
Disallow: /wiki/
Allow: /wiki/Special:Heroes
"#,
        );

        assert!(!robots.is_allowed(AGENT, "/wiki/Hela"));
        assert!(robots.is_allowed(AGENT, "/wiki/Special:Heroes"));
    }

    #[test]
    fn wildcards_and_anchors() {
        let robots = RobotsTxt::parse(
            r#"
User-agent: *
Disallow: /*?action=
Disallow: /*.php$
"#,
        );

        assert!(!robots.is_allowed(AGENT, "/wiki/Hela?action=edit"));
        assert!(!robots.is_allowed(AGENT, "/index.php"));
        assert!(robots.is_allowed(AGENT, "/index.php?title=Hela"));
        assert!(robots.is_allowed(AGENT, "/wiki/Hela"));
    }

    #[test]
    fn shared_group_for_consecutive_agents() {
        let robots = RobotsTxt::parse(
            r#"
User-agent: herodex
User-agent: otherbot
Disallow: /wiki/Secret
"#,
        );

        assert!(!robots.is_allowed(AGENT, "/wiki/Secret"));
        assert!(!robots.is_allowed("otherbot", "/wiki/Secret"));
        assert!(robots.is_allowed("thirdbot", "/wiki/Secret"));
    }

    #[test]
    fn bare_user_agent_line_matches_nobody() {
        let robots = RobotsTxt::parse("User-agent:\nAllow: /\n\nUser-agent: *\nDisallow: /\n");
        assert!(!robots.is_allowed(AGENT, "/wiki/Hela"));
    }

    #[test]
    fn empty_robots_allows_everything() {
        let robots = RobotsTxt::parse("");
        assert!(robots.is_allowed(AGENT, "/any/path"));
    }
}
