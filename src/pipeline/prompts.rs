//! Prompt builders for the extraction oracle
//!
//! The triple format, word-count bounds, and worked examples live here
//! and only here. The 1–5 word subject/object and 1–4 word relation
//! bounds are advertised to the oracle; the validator deliberately does
//! not enforce them.

const STRICT_RULES: &str = r#"STRICT RULES:
- Each line MUST contain exactly 3 parts: subject, relation, object.
- Subject and object MUST each be 1–5 words (no long descriptions, no clauses).
- Relation MUST be 1–4 words.
- DO NOT include explanations, reasons, comparisons, or long sentences.
- If you cannot extract a valid triplet under these rules, skip it (do not generate).
- Output only valid triplets, one per sentence."#;

const WORKED_EXAMPLES: &str = r#"Example 1:
Input: Albert Einstein developed the theory of relativity while working in Switzerland.
Outputs:
"Albert Einstein"|"developed"|"theory of relativity"
"Albert Einstein"|"worked in"|"Switzerland"

Example 2:
Input: The Eiffel Tower in Paris was designed by Gustave Eiffel and completed in 1889.
Outputs:
"Eiffel Tower"|"located"|"Paris"
"Eiffel Tower"|"designed by"|"Gustave Eiffel"
"Eiffel Tower"|"completed"|"1889"

Example 3:
Input: Barack Obama served as the 44th president of the United States from 2009 to 2017.
Outputs:
"Barack Obama"|"served as"|"44th president"
"Barack Obama"|"president of"|"United States"
"Barack Obama"|"served from"|"2009"
"Barack Obama"|"served until"|"2017"

Example 4:
Input: Roberts & Vinter came under financial pressure after their printer went bankrupt.
Outputs:
"Roberts & Vinter"|"came under"|"financial pressure"
"Roberts & Vinter"|"impacted by"|"printer bankruptcy"

Example 5:
Input: FBI Mortgage Fraud Department came into existence.
Outputs:
"FBI Mortgage Fraud Department"|"came into"|"existence"

Example 6:
Input: Tyler Bates worked with films like "Dawn of the Dead, 300, Sucker Punch," and "John Wick." He has collaborated with directors like Zack Snyder, Rob Zombie, Neil Marshall, William Friedkin, Scott Derrickson, and James Gunn.
Outputs:
"Tyler Bates"|"known for film"|"Dawn of the Dead"
"Tyler Bates"|"known for film"|"300"
"Tyler Bates"|"known for film"|"Sucker Punch"
"Tyler Bates"|"known for film"|"John Wick"
"Tyler Bates"|"collaborated with"|"Zack Snyder"
"Tyler Bates"|"collaborated with"|"Rob Zombie"
"Tyler Bates"|"collaborated with"|"Neil Marshall"
"Tyler Bates"|"collaborated with"|"William Friedkin"
"Tyler Bates"|"collaborated with"|"Scott Derrickson"
"Tyler Bates"|"collaborated with"|"James Gunn""#;

/// The `[Prev N] …` context block, or the explicit empty marker.
fn context_block(context_texts: &[String]) -> String {
    if context_texts.is_empty() {
        return "(no prior context)".to_string();
    }
    context_texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!("[Prev {}] {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prior facts one per line, or the explicit empty marker.
fn facts_block(facts: &[String]) -> String {
    if facts.is_empty() {
        return "(no prior triplets)".to_string();
    }
    facts.join("\n")
}

/// Base extraction: current segment text only.
pub fn base_extraction(text: &str) -> String {
    format!(
        "Extract only factual triplets from the following text in the format: \
         \"Subject\"|\"Relation\"|\"Object\".\n{rules}\n\n{examples}\n\nText:\n{text}\n",
        rules = STRICT_RULES,
        examples = WORKED_EXAMPLES,
        text = text,
    )
}

/// Rewrite the current text, substituting pronouns with antecedents found
/// in the earlier context. Output is rewritten prose, not triples.
pub fn rewrite(text: &str, context_texts: &[String]) -> String {
    format!(
        "You are a precise coreference resolver.\n\
         Using ONLY the information in the earlier context, rewrite the CURRENT CHUNK so that every pronoun in the CURRENT CHUNK\n\
         (e.g., I, he, she, it, they, who/whom/whose, and possessives like his/her/their/its/my) is replaced with the explicit named entity it refers to.\n\
         \n\
         Constraints:\n\
         - Rewrite ONLY the CURRENT CHUNK text (do not summarize or add info).\n\
         - Keep meaning, tense, and structure; just replace pronouns with their antecedents.\n\
         - If an antecedent is ambiguous or not present in context, leave the original word as-is.\n\
         - Output ONLY the rewritten chunk text without any labels or explanations.\n\
         \n\
         EARLIER CONTEXT:\n{context}\n\
         \n\
         CURRENT CHUNK:\n{text}\n",
        context = context_block(context_texts),
        text = text,
    )
}

/// Single-call extraction with raw prior texts inlined as context.
pub fn context_extraction(text: &str, context_texts: &[String]) -> String {
    format!(
        "Extract only factual triplets from the following text in the format: \
         \"Subject\"|\"Relation\"|\"Object\". You are an information extraction system \
         that MUST resolve pronouns using earlier context.\n\
         \n\
         TASK:\n\
         - Use the EARLIER CONTEXT plus the CURRENT CHUNK to extract factual triplets from the CURRENT CHUNK in the strict format: \"Subject\"|\"Relation\"|\"Object\".\n\
         - When a pronoun in the CURRENT CHUNK (e.g., he/she/it/they/his/her/their/its/I/me/my...) refers to an entity introduced in the EARLIER CONTEXT or CURRENT CHUNK, you MUST replace it with the explicit named entity in the output triplets.\n\
         \n\
         {rules}\n\
         \n\
         {examples}\n\
         \n\
         EARLIER CONTEXT:\n{context}\n\
         \n\
         CURRENT CHUNK:\n{text}\n",
        rules = STRICT_RULES,
        examples = WORKED_EXAMPLES,
        context = context_block(context_texts),
        text = text,
    )
}

/// Single-call extraction grounded in facts already accepted this run.
pub fn fact_grounded_extraction(text: &str, prior_facts: &[String]) -> String {
    format!(
        "You are an information extraction system that MUST resolve pronouns in the \
         CURRENT CHUNK using ONLY the PRIOR TRIPLETS as context.\n\
         PRIOR TRIPLETS provide explicit entities and relations. Replace pronouns in your understanding (he/she/it/they/his/her/their/its/I/me/my...) with the most plausible explicit entity grounded in PRIOR TRIPLETS, when possible.\n\
         \n\
         TASK:\n\
         - Extract factual triplets from the CURRENT CHUNK only, in the strict format: \"Subject\"|\"Relation\"|\"Object\".\n\
         - When a pronoun in the CURRENT CHUNK refers to an entity found in PRIOR TRIPLETS, you MUST output the explicit named entity instead of the pronoun.\n\
         - Do NOT output triplets about the prior context unless they are also asserted in the CURRENT CHUNK.\n\
         \n\
         {rules}\n\
         \n\
         {examples}\n\
         \n\
         PRIOR TRIPLETS:\n{facts}\n\
         \n\
         CURRENT CHUNK:\n{text}\n",
        rules = STRICT_RULES,
        examples = WORKED_EXAMPLES,
        facts = facts_block(prior_facts),
        text = text,
    )
}

/// Standalone pronoun resolution over one window of free text: antecedents
/// come from the window itself.
pub fn resolve_window(text: &str) -> String {
    format!(
        "You are a precise coreference resolver.\n\
         Rewrite the TEXT below so that every pronoun (e.g., I, he, she, it, they, \
         who/whom/whose, and possessives like his/her/their/its/my) is replaced with \
         the explicit named entity it refers to, using only entities that appear in \
         the TEXT itself.\n\
         \n\
         Constraints:\n\
         - Do not summarize, reorder, or add information.\n\
         - Keep meaning, tense, and sentence structure; just replace pronouns with their antecedents.\n\
         - If an antecedent is ambiguous, leave the original word as-is.\n\
         - Output ONLY the rewritten text without any labels or explanations.\n\
         \n\
         TEXT:\n{text}\n",
        text = text,
    )
}
