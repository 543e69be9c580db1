//! Prompt construction for company profiles and CSR news.
//!
//! The company prompt embeds the full JSON shape the parser expects, so the
//! two must change together (see `parse.rs`).

use chrono::NaiveDate;

use crate::types::SearchMode;
use crate::util::fiscal_year_label;

/// Section headings the news hub prompt asks for, in display order.
pub const NEWS_SECTION_MARKERS: [&str; 4] = [
    "LATEST CSR NEWS:",
    "UPCOMING CSR & EDUCATION EVENTS:",
    "CSR & EDUCATION AWARDS:",
    "SPECIFIC EDUCATION CSR INITIATIVES:",
];

/// Text the news hub prompt tells the model to use for an empty section.
pub const NO_SECTION_INFO: &str = "No specific information found at this time.";

const DEEP_SEARCH_INSTRUCTIONS: &str = "
For this deep search, please be particularly thorough. Cross-reference information from multiple sources to ensure accuracy.
Look for nuanced details, such as the company's overall CSR reputation, the general tone of their public disclosures regarding social responsibility,
and any significant positive or negative media mentions related to their CSR activities or educational initiatives.
Synthesize these findings into the 'otherInfo' or 'notesOverall' fields if they don't fit elsewhere.
";

// Placeholders: @COMPANY@, @DATE@, @FISCAL_YEAR@, @DEEP@
const COMPANY_PROFILE_TEMPLATE: &str = r#"
You are an AI assistant tasked with gathering public information about companies.
For the company "@COMPANY@", please find and provide the following information in a structured JSON format.
Ensure all URLs are fully qualified. If a piece of information is not found, use "N/A" for string fields, null for objects or boolean fields where appropriate, or an empty array for lists.
Prioritize information from official company websites, reputable financial news sources, and official registries.
Use Google Search to find this information.
@DEEP@

The JSON structure MUST be as follows:

{
  "nameOfCompany": "string (The official name of the company: @COMPANY@)",
  "companyLinkedInURL": "string (full URL or N/A)",
  "cinNumber": "string (Corporate Identification Number - CIN, EIN, etc. or N/A)",
  "segmentation": "string (e.g., Large Cap, Mid Cap, SME or N/A)",
  "priority": "string (e.g., High, Medium, Low or N/A)",
  "spoc": "string (Single Point of Contact name if identifiable, else N/A)",
  "promoterLed": "boolean (true/false, or null if unknown)",
  "nameOfPromoter": "string (if promoterLed is true, else N/A)",
  "industryType": "string (e.g., Technology, Finance, Manufacturing or N/A)",
  "entityType": "string (Indian/Global or N/A)",
  "officeLocation": "string (Primary office address or N/A)",
  "projectLocations": ["string (list of key project locations or N/A if none)"],
  "domain": "string (Company's primary website domain or N/A)",
  "dataRetrievalDate": "@DATE@",
  "budgetInformation": [
    { "year": "2020-21", "totalBudget": "string (amount with currency or N/A)", "educationBudget": "string (amount with currency or N/A)" },
    { "year": "2021-22", "totalBudget": "string (amount with currency or N/A)", "educationBudget": "string (amount with currency or N/A)" },
    { "year": "2022-23", "totalBudget": "string (amount with currency or N/A)", "educationBudget": "string (amount with currency or N/A)" },
    { "year": "2023-24", "totalBudget": "string (amount with currency or N/A)", "educationBudget": "string (amount with currency or N/A)" },
    { "year": "@FISCAL_YEAR@", "totalBudget": "string (amount with currency or N/A)", "educationBudget": "string (amount with currency or N/A)" }
  ],
  "csrEducationFocus": {
    "doesEducation": "boolean (true/false if they focus on education, or null if unknown)",
    "educationSpend": "string (amount or % of budget, or N/A)",
    "isCorporateFoundation": "boolean (true/false if they have a foundation, or null if unknown)",
    "currentNgoPartners": ["string (list of NGO partner names or N/A if none)"],
    "programType": ["string (e.g., Education, Health, Environment or N/A if none)"],
    "csrAmountINRcr": "string (total CSR amount in INR Crores, or N/A)",
    "csrCommitteeMembers": [
      { "name": "string (or N/A)", "designation": "string (or N/A)", "contactInfo": "string (email/phone if public, else N/A)", "linkedInProfileUrl": "string (URL or N/A)" }
    ]
  },
  "keyContacts": {
    "primaryDecisionMaker": { "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" },
    "secondaryDecisionMaker": { "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" },
    "alternativeDecisionMaker": { "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" }
  },
  "pointsOfContact": [
    { "pocNumber": 1, "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" },
    { "pocNumber": 2, "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" },
    { "pocNumber": 3, "name": "string (or N/A)", "designation": "string (or N/A)", "email": "string (if public, else N/A)", "phone": "string (if public, else N/A)", "notes": "string (or N/A)" }
  ],
  "strategicOperationalInfo": {
    "proposedApproach": "string (brief summary or N/A)",
    "commentsStatus": "string (e.g., Initial Research, Contacted, Follow-up Needed or N/A)",
    "weekOfOutreach": "string (e.g., YYYY-WW or N/A)",
    "primaryLocationFinanceOrOffice": "string (City/Region or N/A)",
    "otherInfo": "string (any other relevant public info or N/A)",
    "notesOverall": "string (general notes or N/A)"
  }
}

Respond ONLY with the JSON object. Do not add any explanatory text before or after the JSON.
The company name is "@COMPANY@". Ensure "nameOfCompany" in the JSON is exactly this.
"#;

/// Build the profile prompt for one company.
///
/// Deterministic for a given `today`: the date and the rolling fiscal-year
/// row are the only time-dependent parts.
pub fn company_profile_prompt(company_name: &str, mode: SearchMode, today: NaiveDate) -> String {
    let deep = match mode {
        SearchMode::Deep => DEEP_SEARCH_INSTRUCTIONS,
        SearchMode::Standard => "",
    };

    COMPANY_PROFILE_TEMPLATE
        .replace("@DEEP@", deep)
        .replace("@DATE@", &today.format("%Y-%m-%d").to_string())
        .replace("@FISCAL_YEAR@", &fiscal_year_label(today))
        .replace("@COMPANY@", company_name)
}

/// Prompt for the general CSR news hub, split into the four marker sections.
pub fn news_hub_prompt() -> String {
    let [news, events, awards, education] = NEWS_SECTION_MARKERS;
    format!(
        "
Please provide information clearly separated into the following sections: '{news}', '{events}', '{awards}', and '{education}'.

For '{news}':
- Include recent (last 3-6 months) news articles related to Corporate Social Responsibility (CSR) initiatives, trends, and funding globally and in India.
- For each item, provide a title and a brief summary.

For '{events}':
- List upcoming conferences, workshops, webinars, or funding deadlines related to CSR and education.
- For each event, include: its name, date(s), location (or 'Online' if virtual), a brief description of its focus, and if publicly available, a direct URL for registration or more information. Ensure URLs are fully qualified.

For '{awards}':
- List notable awards recognizing CSR and education initiatives.
- For each award, include: the award name, a brief description of its purpose/focus, the organizing body, and if publicly available, a URL for nominations or further details. Ensure URLs are fully qualified.

For '{education}':
- Detail recent news, upcoming events (including registration links), and awards specifically related to corporate social responsibility in the education sector.
- This should focus on initiatives like school support, scholarships, vocational training, and digital literacy programs funded or run by corporations.
- For events and awards in this education-specific section, include similar details as requested in the general events and awards sections (name, date, location, description, URLs). Ensure URLs are fully qualified.

Use Google Search to find this information.
If no information is found for a subsection, please state '{missing}' under that section's heading.
Structure the entire response as plain text with these clear section headings as the primary separators.
",
        missing = NO_SECTION_INFO,
    )
}

/// Prompt for a short recent-CSR-news summary about one company.
pub fn company_news_prompt(company_name: &str) -> String {
    format!(
        "Provide a concise summary of recent (last 3-6 months) CSR news and initiatives specifically for \"{}\". \
Focus on their community engagement, environmental efforts, and education-related programs if any. \
Include direct URLs to the news articles or official press releases where available. \
Use Google Search and list the source URLs. \
If no specific recent CSR news is found for this company, state that clearly.",
        company_name
    )
}
