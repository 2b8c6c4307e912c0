use meeting_rag::{FragmentKind, RagAnswer, RetrievalResult, StoreStats};

const RULE: &str = "================================================================================";
const PREVIEW_CHARS: usize = 150;
const DETAILED_RESULTS: usize = 3;

pub fn print_answer(answer: &RagAnswer, detailed: bool) {
    let generated = &answer.generated_answer;

    println!("\nAnswer:");
    println!("{RULE}");
    println!("{}\n", generated.answer);
    println!("Confidence: {:.2}", generated.confidence);
    println!("Sources Used: {} fragments", generated.sources_used);
    if let Some(scores) = generated.retrieval_scores.as_deref().filter(|s| !s.is_empty()) {
        let average = scores.iter().sum::<f32>() / scores.len() as f32;
        println!("Average Retrieval Score: {average:.3}");
    }
    if let Some(error) = &generated.error {
        println!("Generation error: {error}");
    }

    if detailed {
        println!("\nRaw Retrieved Fragments ({} results):", answer.total_found);
        println!("{RULE}");
        for (rank, result) in answer.retrieved.iter().take(DETAILED_RESULTS).enumerate() {
            print_result(rank + 1, result);
        }
    }
}

pub fn print_results(query: &str, results: &[RetrievalResult]) {
    println!("\nResults for \"{query}\" ({} found):", results.len());
    println!("{RULE}");
    for (rank, result) in results.iter().enumerate() {
        print_result(rank + 1, result);
    }
}

pub fn print_stats(stats: &StoreStats) {
    println!("Total fragments: {}", stats.total_points);
    println!("Vector size: {}", stats.vector_size);
    println!("Distance: {}", stats.distance);
}

fn print_result(rank: usize, result: &RetrievalResult) {
    let fragment = &result.fragment;
    println!(
        "\n{rank}. [{}] Score: {:.3}",
        fragment.category().as_str().to_uppercase(),
        result.score
    );
    println!("   Meeting: {}", fragment.record_id);
    if let Some(speaker) = &fragment.speaker {
        match &fragment.role {
            Some(role) => println!("   Speaker: {speaker} ({role})"),
            None => println!("   Speaker: {speaker}"),
        }
    }

    match &fragment.kind {
        FragmentKind::ActionItem(details) => {
            println!("   Task: {}", fragment.text);
            if let Some(assignee) = &details.assigned_to {
                println!("   Assigned to: {assignee}");
            }
            if let Some(due) = &details.due_date {
                println!("   Due: {due}");
            }
            if let Some(priority) = &details.priority {
                println!("   Priority: {priority}");
            }
        }
        FragmentKind::Minute | FragmentKind::KeyInsight => {
            println!("   Content: {}", preview(&fragment.text));
        }
    }
    println!("----------------------------------------");
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
