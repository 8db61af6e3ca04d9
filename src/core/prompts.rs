//! Fixed prompt templates for each chain stage.
//!
//! The wording is a contract with the model service; changing it changes the
//! shape and quality of the responses downstream stages depend on.

/// Instruction sent alongside the PDF to the vision-capable model.
pub const EXTRACTION_INSTRUCTION: &str = "Analyze this building plans PDF and extract key \
building characteristics in a structured format. Include details about square footage, \
number of rooms, window specifications, insulation values, and construction materials.";

/// Prompt for deriving climate and construction assumptions from the
/// location and the extracted building data.
pub fn assumptions_prompt(location: &str, static_data: &str) -> String {
    format!(
        "Given the location \"{location}\" and the following building data:\n\
         {static_data}\n\
         \n\
         Generate reasonable assumptions for Manual J calculations including:\n\
         1. Local climate data and design temperatures\n\
         2. Insulation effectiveness\n\
         3. Duct system losses\n\
         4. Infiltration rates\n\
         \n\
         Return the assumptions in JSON format."
    )
}

/// Prompt for the load calculation itself, combining both prior artifacts.
pub fn calculation_prompt(static_data: &str, assumptions: &str) -> String {
    format!(
        "Using the following building data and assumptions, perform Manual J load calculations:\n\
         \n\
         Building Data:\n\
         {static_data}\n\
         \n\
         Assumptions:\n\
         {assumptions}\n\
         \n\
         Calculate and return:\n\
         1. Heating load (BTU/h)\n\
         2. Cooling load (BTU/h)\n\
         3. Room-by-room load breakdown\n\
         4. Peak load conditions"
    )
}

/// Prompt for turning the calculation results into chart and CSV payloads.
pub fn visualization_prompt(results: &str) -> String {
    format!(
        "Convert these Manual J results into visualization data:\n\
         {results}\n\
         \n\
         Generate:\n\
         1. A chart specification (as a base64 encoded PNG string)\n\
         2. CSV data for detailed analysis\n\
         \n\
         Return both in JSON format."
    )
}

/// Context block seeding a results-chat conversation.
pub fn chat_context(static_data: &str, assumptions: &str) -> String {
    format!("Project Static Data: {static_data}\nCurrent Assumptions: {assumptions}")
}
