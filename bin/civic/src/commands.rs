use civic_core::{
    SuggestSimilarIssuesInput, SummarizeIssuesInput, suggest_similar_issues,
    summarize_issues_for_official,
};

use crate::opts::AiOpts;

pub async fn suggest(ai: AiOpts, description: String, location: String) -> anyhow::Result<()> {
    let service = ai.completion_service()?;
    let input = SuggestSimilarIssuesInput {
        description,
        location,
    };
    let output = suggest_similar_issues(service.as_ref(), &input).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn summarize(ai: AiOpts, issues: Vec<String>) -> anyhow::Result<()> {
    let service = ai.completion_service()?;
    let output = summarize_issues_for_official(service.as_ref(), &SummarizeIssuesInput { issues })
        .await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
