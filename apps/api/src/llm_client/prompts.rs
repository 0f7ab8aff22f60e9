// Cross-cutting prompt fragments. Service-specific prompts live next to the
// service that uses them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Builds the prompt that asks a model to fix its own malformed output.
pub fn build_repair_prompt(format_instructions: &str, output: &str, error: &str) -> String {
    format!(
        "Instructions:\n--------------\n{format_instructions}\n--------------\n\
         Completion:\n--------------\n{output}\n--------------\n\n\
         Above, the Completion did not satisfy the constraints given in the Instructions.\n\
         Error:\n--------------\n{error}\n--------------\n\n\
         Please try again. Please only respond with an answer that satisfies the \
         constraints laid out in the Instructions:"
    )
}
