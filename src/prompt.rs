use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, Lines};

use crate::runner::RunConfig;

const CLAIMS_QUESTION: &str = "Enter the number of faucet claims to perform per wallet: ";
const PURCHASES_QUESTION: &str = "Enter the number of properties to buy per wallet (0 for none): ";

/// Accepts a non-negative integer, surrounding whitespace allowed.
pub fn parse_count(input: &str, what: &str) -> eyre::Result<u32> {
    input.trim().parse::<u32>().map_err(|_| {
        eyre::eyre!("Invalid input for {what}: {input:?}. Please enter a non-negative number.")
    })
}

async fn ask<R>(lines: &mut Lines<R>, question: &str) -> eyre::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    Ok(lines.next_line().await?.unwrap_or_default())
}

/// Uses the value given on the command line, otherwise asks on the terminal.
async fn count_from<R>(
    lines: &mut Lines<R>,
    given: Option<String>,
    question: &str,
    what: &str,
) -> eyre::Result<u32>
where
    R: AsyncBufRead + Unpin,
{
    let input = match given {
        Some(input) => input,
        None => ask(lines, question).await?,
    };

    parse_count(&input, what)
}

pub async fn read_run_config_from<R>(
    reader: R,
    claims: Option<String>,
    purchases: Option<String>,
    claim_delay: Duration,
) -> eyre::Result<RunConfig>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    let num_claims = count_from(&mut lines, claims, CLAIMS_QUESTION, "faucet claims").await?;
    let num_to_buy =
        count_from(&mut lines, purchases, PURCHASES_QUESTION, "properties to buy").await?;

    Ok(RunConfig {
        num_claims,
        num_to_buy,
        claim_delay,
    })
}

pub async fn read_run_config(
    claims: Option<String>,
    purchases: Option<String>,
    claim_delay: Duration,
) -> eyre::Result<RunConfig> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    read_run_config_from(stdin, claims, purchases, claim_delay).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(20);

    #[test]
    fn counts_accept_non_negative_integers() {
        assert_eq!(parse_count("3", "claims").unwrap(), 3);
        assert_eq!(parse_count(" 0\r", "claims").unwrap(), 0);
    }

    #[test]
    fn counts_reject_negative_and_garbage() {
        for input in ["-1", "abc", "", "2.5", "3abc"] {
            let err = parse_count(input, "faucet claims").unwrap_err();
            assert!(err.to_string().contains("faucet claims"), "{input}");
        }
    }

    #[tokio::test]
    async fn both_counts_are_read_from_input() {
        let config = read_run_config_from(&b"3\n2\n"[..], None, None, DELAY)
            .await
            .unwrap();

        assert_eq!(
            config,
            RunConfig {
                num_claims: 3,
                num_to_buy: 2,
                claim_delay: DELAY,
            }
        );
    }

    #[tokio::test]
    async fn flags_skip_the_prompt() {
        let config = read_run_config_from(&b"9\n"[..], Some("1".into()), None, DELAY)
            .await
            .unwrap();

        assert_eq!(config.num_claims, 1);
        assert_eq!(config.num_to_buy, 9);
    }

    #[tokio::test]
    async fn invalid_first_answer_stops_before_second_question() {
        let err = read_run_config_from(&b"-1\n2\n"[..], None, None, DELAY)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("faucet claims"));

        let err = read_run_config_from(&b"1\nabc\n"[..], None, None, DELAY)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("properties to buy"));
    }

    #[tokio::test]
    async fn closed_input_is_invalid() {
        assert!(read_run_config_from(&b""[..], None, None, DELAY).await.is_err());
    }
}
