/// Build the generation instruction for a location and free-text prompt.
///
/// The model is told to honour the prompt when it is meaningful and to fall
/// back to the generic best places for the location otherwise, and to read
/// the attached CSV as the customer's recent search history.
pub fn build_instruction(location: &str, prompt: &str) -> String {
    format!(
        "Based on the attached context file and your general knowledge, \
         generate a list of the 5 best places to visit in {location}. \
         The output MUST strictly follow the provided JSON schema. \
         Assume a customer is asking you for information about {location} with the prompt '{prompt}' \
         and give the best results you can for that prompt. \
         If the prompt is empty, irrelevant or incoherent, ignore it and return \
         the best places to visit in {location} instead. \
         The attached CSV file lists the customer's recent searches \
         (project, prompt, timestamp); use it as prior search-history context."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_location_prompt_and_fallback() {
        let instruction = build_instruction("Kyoto", "quiet temples");

        assert!(instruction.contains("5 best places to visit in Kyoto"));
        assert!(instruction.contains("'quiet temples'"));
        assert!(instruction.contains("best places to visit in Kyoto instead"));
        assert!(instruction.contains("search-history"));
    }
}
