// All LLM prompt templates for the recruiting module.
// Placeholders in `{braces}` are substituted by `render_template` in a single pass.
// Literal JSON braces in the examples are safe: only exact placeholder names are replaced.

/// Markdown skeleton shown to the model as the expected job-description layout.
pub const JD_MARKDOWN_EXAMPLE: &str = "**Job Title:** Sample Data Analyst
**Company:** Example Corp
**Location:** Remote

## Job Summary
We are looking for a skilled Data Analyst to join our team and turn data into actionable insights, requiring 2 years of relevant experience.

## Responsibilities
- Collect and analyze large datasets from various sources.
- Develop and maintain reporting dashboards using Python and SQL.
- Collaborate with stakeholders to define key performance indicators.
- Ensure data integrity and quality across all reports.

## Required Qualifications
- Minimum of 2 years of professional experience in data analysis.
- Proficient in: SQL, Python, and Tableau.
- Strong attention to detail and analytical thinking.

## What We Offer
- Competitive salary and flexible work environment.
- Opportunities for professional growth and skill development.
- Comprehensive health and wellness benefits.";

/// Job-description prompt.
/// Replace: {company_name}, {job_title}, {employment_type}, {location}, {industry},
///          {years_of_experience}, {must_have_skills}, {escaped_markdown}
pub const JD_PROMPT_TEMPLATE: &str = r#"Generate a comprehensive, professional, and well-structured Job Description
formatted entirely in **Markdown** based on the following specifications:

1. **Company:** {company_name}
2. **Job Title:** {job_title}
3. **Employment Type:** {employment_type}
4. **Location:** {location}
5. **Industry:** {industry}
6. **Minimum Experience:** {years_of_experience} years
7. **Must-Have Skills:** {must_have_skills}

The Markdown content MUST include these sections:
- **Job Summary**
- **Responsibilities**
- **Required Qualifications** (Must include the experience and skill requirements)
- **What We Offer**

---

**JSON Output Example:**

```json
{
  "job_description": "{escaped_markdown}"
}
```

Place the complete Markdown content you generate into the 'job_description' key
of the required JSON format."#;

/// Resume matching prompt.
/// Replace: {unknown_name}, {unknown_email}, {jd_text}, {resume_text},
///          {jd_keywords}, {resume_keywords}
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert AI recruiter. Your task is to **extract the candidate's name and email**, and then semantically compare a Job Description (JD) and a Resume to produce a single match score (0-100) and an analysis.

**Instructions:**
1. **REQUIRED EXTRACTION:** Extract the **Full Name** and **Primary Email** of the candidate from the resume and place them into the designated JSON fields. If data is not found, use "{unknown_name}" and "{unknown_email}".
2. The core score must be based on the semantic match between the JD's 'Required Qualifications' and the Resume's 'Experience' and 'Skills' sections.
3. The score should heavily weight the Must-Have Skills listed in the JD.
4. The summary_remark must be 1-2 sentences justifying the score, naming a major strength and a weakness.
5. For missing_skills STRICTLY list 3-5 skills required by the job description that are missing or weak in the resume. If no skills are missing, return a single entry stating that all the required skills are matched.

---

**Job Description (JD) Content:**
{jd_text}

**Candidate Resume Content:**
{resume_text}

---

**Keywords extracted locally (for reference only, not for scoring):**
- **JD Keywords:** {jd_keywords}
- **Resume Keywords:** {resume_keywords}

**Output Example:**
```json
{
  "candidate_name": "Alex Chen",
  "candidate_email": "alex.chen@example.com",
  "match_score": 90,
  "summary_remark": "Excellent technical alignment, especially in cloud architecture and Terraform. Focus on gaining experience in multi-cloud governance to maximize future potential.",
  "missing_skills": ["CI/CD pipeline management", "Multi-cloud governance experience", "Advanced Python scripting for automation"]
}
```"#;

/// Single feedback-email prompt.
/// Replace: {tone}, {candidate_name}, {job_title}, {match_score}, {remark},
///          {missing_skills}, {closing_line}
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"Generate a professional and personalized email to a job candidate with the following details.
The email must adhere to this tone: {tone}

**Candidate Details:**
- Name: {candidate_name}
- Job Applied For: {job_title}
- Match Score (0-100): {match_score}
- Match Summary/Remark: "{remark}"
- Critical Missing Skills: {missing_skills}

**Email Structure Requirements:**
1. **Salutation:** Start with "Dear {candidate_name}".
2. **Acknowledge Application:** Briefly thank them for their interest.
3. **Provide Context:** Mention the summary remark to justify the result. Don't show the score.
4. **Constructive Feedback:** Explicitly mention the missing skills as areas for development. (Use the list: {missing_skills}).
5. **Closing:** Use the closing line: "{closing_line}"
6. **Signature:** The email body must end with the final message, followed by:
"\n\nSincerely,\n\nThe Hiring Team"
(Use the JSON newline escape sequence '\n' to separate lines.)

**EXAMPLE (Score 65 - Professional and Balanced Tone):**
```json
{
  "subject": "Update on Your Application for Senior Cloud Solutions Architect",
  "body": "Dear Alex Chen,\n\nThank you for your interest in the Senior Cloud Solutions Architect position and for taking the time to submit your application.\n\nYour profile showed excellent technical alignment, especially in cloud architecture and Terraform.\n\nTo fully align with the senior requirements of this role, we recommend gaining further experience in CI/CD pipeline management, multi-cloud governance and advanced Python scripting for automation.\n\nWe encourage you to use the feedback below for future applications. We may contact you for other roles.\n\nSincerely,\n\nThe Hiring Team"
}
```"#;

/// Batch feedback-email prompt.
/// Replace: {job_title}, {candidate_blocks}
pub const BATCH_EMAIL_PROMPT_TEMPLATE: &str = r#"Generate one professional and personalized feedback email for EACH job candidate listed below.
All candidates applied for the role: {job_title}

Every candidate block states the tone and the exact closing line to use for that candidate.

{candidate_blocks}

**Email Structure Requirements (for every email):**
1. **Salutation:** Start with "Dear <candidate name>".
2. **Acknowledge Application:** Briefly thank them for their interest.
3. **Provide Context:** Mention their summary remark to justify the result. Don't show the score.
4. **Constructive Feedback:** Explicitly mention their missing skills as areas for development.
5. **Closing:** Use the candidate's closing line verbatim.
6. **Signature:** Every body must end with "\n\nSincerely,\n\nThe Hiring Team".

Return a JSON object with an "emails" array containing exactly one entry per candidate.
Each entry MUST repeat the candidate_name exactly as given above.

**Output Example:**
```json
{
  "emails": [
    {
      "candidate_name": "Alex Chen",
      "subject": "Update on Your Application for Senior Cloud Solutions Architect",
      "body": "Dear Alex Chen,\n\n...\n\nSincerely,\n\nThe Hiring Team"
    }
  ]
}
```"#;

/// One candidate inside the batch prompt.
/// Replace: {index}, {candidate_name}, {match_score}, {remark}, {missing_skills},
///          {tone}, {closing_line}
pub const BATCH_CANDIDATE_BLOCK: &str = r#"### Candidate {index}
- Name: {candidate_name}
- Match Score (0-100): {match_score}
- Match Summary/Remark: "{remark}"
- Critical Missing Skills: {missing_skills}
- Tone: {tone}
- Closing line: "{closing_line}""#;
