//! Canonical URLs of the extensions and code systems the builder reads and writes

pub const HIDDEN: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-hidden";
pub const ITEM_CONTROL: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-itemControl";
pub const ITEM_CONTROL_SYSTEM: &str = "http://hl7.org/fhir/questionnaire-item-control";
pub const UNIT: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-unit";
pub const VARIABLE: &str = "http://hl7.org/fhir/StructureDefinition/variable";

pub const OBSERVATION_LINK_PERIOD: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-observationLinkPeriod";
pub const OBSERVATION_EXTRACT: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-observationExtract";
pub const ITEM_EXTRACTION_CONTEXT: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-itemExtractionContext";
pub const ANSWER_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-answerExpression";
pub const CALCULATED_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-calculatedExpression";
pub const INITIAL_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-initialExpression";
pub const LAUNCH_CONTEXT: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-launchContext";
pub const PREFERRED_TERMINOLOGY_SERVER: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-preferredTerminologyServer";
pub const ITEM_SOURCE: &str =
    "https://aphp.fr/ig/fhir/formbuilder/StructureDefinition/QuestionnaireItemSource";

pub const LAUNCH_CONTEXT_SYSTEM: &str = "http://hl7.org/fhir/uv/sdc/CodeSystem/launchContext";
pub const LAUNCH_CONTEXT_VALUE_SET: &str = "http://hl7.org/fhir/uv/sdc/ValueSet/launchContext";
pub const UCUM: &str = "http://unitsofmeasure.org";
pub const LOINC: &str = "http://loinc.org";

pub const USAGE_CONTEXT_TYPE_SYSTEM: &str =
    "https://aphp.fr/ig/fhir/eds/CodeSystem/aphp-eds-usage-context-type-cs";
pub const USAGE_CONTEXT_DOMAIN_CODE: &str = "domain";
pub const USAGE_CONTEXT_DOMAIN_DISPLAY: &str = "Domaine métier";

pub const IG_ROOT: &str = "https://aphp.fr/ig/fhir/eds";
pub const QUESTIONNAIRE_PROFILE: &str =
    "https://aphp.fr/ig/fhir/eds/StructureDefinition/aphp-eds-questionnaire";
pub const FORM_BUILDER_ENDPOINT: &str = "https://aphp.fr/ig/fhir/eds/Endpoint/form-builder";
