// Resume extraction prompt templates.
// All prompts for the parser module are defined here.

pub const EXTRACTION_PROMPT: &str = r#"You are a precise resume parser. Extract information from the resume text and return ONLY valid JSON.

RESUME TEXT:
{resume_text}

STRICT INSTRUCTIONS:
1. Extract ALL information accurately from the text above
2. Return ONLY the JSON object below - no other text
3. Use empty strings "" for missing text fields
4. Use empty arrays [] for missing list fields
5. Ensure ALL JSON is properly formatted with quotes
6. Do NOT add explanations, markdown, or extra text

REQUIRED JSON STRUCTURE:
{
  "personalInfo": {
    "name": "",
    "email": "",
    "phone": "",
    "location": ""
  },
  "experience": [
    {
      "position": "",
      "company": "",
      "duration": "",
      "description": [""]
    }
  ],
  "education": [
    {
      "degree": "",
      "institution": "",
      "year": "",
      "description": [""]
    }
  ],
  "projects": [
    {
      "title": "",
      "description": [""]
    }
  ],
  "achievements": [
    {
      "title": "",
      "description": [""]
    }
  ],
  "certificates": [
    {
      "title": "",
      "issuer": "",
      "year": "",
      "description": [""]
    }
  ],
  "skills": [],
  "additionalInformation": []
}

JSON RESPONSE:"#;

/// Compact schema for the one-shot retry after the main prompt produced
/// unusable output. Less structure for the model to get wrong.
pub const STRICT_RETRY_PROMPT: &str = r#"Extract resume information as JSON:

{resume_text}

Return only this JSON format:
{"personalInfo":{"name":"","email":"","phone":"","location":""},"experience":[],"education":[],"projects":[],"achievements":[],"certificates":[],"skills":[],"additionalInformation":[]}"#;
