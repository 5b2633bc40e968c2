// Prompt constants for the ReAct agent.

/// Generation halts here so the model never invents an observation.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// ReAct template. Replace `{tools}`, `{tool_names}`, `{input}` and
/// `{agent_scratchpad}` before sending.
pub const REACT_PROMPT_TEMPLATE: &str = r#"You are an AI Career Assistant Agent that helps users with job applications.
You have access to tools that can parse PDFs, analyze documents, generate tailored resumes and cover letters, and send emails.

Think step-by-step about what the user needs and use the appropriate tools to help them.

TOOLS:
{tools}

TOOL NAMES: {tool_names}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought: {agent_scratchpad}"#;

pub const PARSE_PDF_DESCRIPTION: &str = "Extracts text content from a PDF file. \
    Input should be a file path to a PDF document. \
    Returns the extracted text. Use this to read resume or job description PDFs.";

pub const ANALYZE_JOB_DESCRIPTION: &str = "Analyzes job description text and extracts structured information. \
    Input should be the job description text. \
    Returns JSON with job_title, company_name, contact_email, required_skills, \
    preferred_skills and key_responsibilities.";

pub const ANALYZE_RESUME_DESCRIPTION: &str = "Analyzes resume text and extracts candidate information. \
    Input should be the resume text. \
    Returns JSON with candidate_name, skills, experience, education and summary.";

pub const ANALYZE_SKILL_GAP_DESCRIPTION: &str = "Compares candidate skills against job requirements. \
    Input should be JSON with 'job_skills' and 'candidate_skills' arrays. \
    Returns matching_skills, missing_skills, partial_skills and match_percentage.";

pub const GENERATE_RESUME_DESCRIPTION: &str = "Generates a resume tailored to a specific job. \
    Input should be JSON with 'resume_text', 'job_text' and optional 'format' (pdf or docx, default pdf). \
    Returns the file path of the generated resume.";

pub const GENERATE_COVER_LETTER_DESCRIPTION: &str = "Generates a personalized cover letter for a job application. \
    Input should be JSON with 'resume_text', 'job_text' and optional 'format' (pdf or docx, default pdf). \
    Returns the file path of the generated cover letter.";

pub const SEND_EMAIL_DESCRIPTION: &str = "Sends a job application email with resume and cover letter attachments. \
    Input should be JSON with 'recipient_email', 'subject', 'body', 'resume_path' and 'cover_letter_path'. \
    Returns the send status. Validate documents first.";

pub const VALIDATE_DOCUMENTS_DESCRIPTION: &str = "Checks that generated documents exist and reports their sizes. \
    Input should be JSON with 'resume_path' and/or 'cover_letter_path'. \
    Use this before sending emails.";
